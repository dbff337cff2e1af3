use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

/// Kind of purchasable catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Course,
    Product,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Course => "course",
            ItemKind::Product => "product",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "course" => Ok(ItemKind::Course),
            "product" => Ok(ItemKind::Product),
            other => Err(AppError::BadRequest(format!("invalid item kind: {other}"))),
        }
    }
}

/// Reference to a catalog item by kind and id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct ItemRef {
    pub kind: ItemKind,
    pub id: Uuid,
}

impl ItemRef {
    pub fn course(id: Uuid) -> Self {
        Self {
            kind: ItemKind::Course,
            id,
        }
    }

    pub fn product(id: Uuid) -> Self {
        Self {
            kind: ItemKind::Product,
            id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Paid,
    Failed,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Paid => "paid",
            OrderStatus::Failed => "failed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }

    /// Statuses from which the payment flow never moves again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Paid | OrderStatus::Failed | OrderStatus::Cancelled | OrderStatus::Refunded
        )
    }

    /// Edges of the order status graph. Nothing ever leads back to `pending`.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Processing | Failed | Cancelled)
                | (Processing, Paid | Failed | Cancelled)
                | (Paid, Refunded)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "paid" => Ok(OrderStatus::Paid),
            "failed" => Ok(OrderStatus::Failed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            "refunded" => Ok(OrderStatus::Refunded),
            _ => Err(AppError::BadRequest("Invalid order status".into())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub price: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub price: i64,
    pub discounted_price: Option<i64>,
    pub final_price: i64,
    pub is_free: bool,
    pub stock: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A cart line resolved against the live catalog.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub item_kind: ItemKind,
    pub item_id: Uuid,
    pub title: String,
    pub price: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub discount_percent: i32,
    pub discount_amount: i64,
    pub max_usage: i32,
    pub current_usage: i32,
    pub min_purchase_amount: i64,
    pub is_active: bool,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub apartment: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub notes: String,
    pub total_price: i64,
    pub discount_amount: i64,
    pub tax_amount: i64,
    pub final_price: i64,
    pub coupon_id: Option<Uuid>,
    pub status: OrderStatus,
    pub is_paid: bool,
    pub gateway_authority: Option<String>,
    pub gateway_ref_id: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub item_kind: ItemKind,
    pub item_id: Uuid,
    pub title: String,
    pub price: i64,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paid_never_returns_to_earlier_states() {
        for next in [OrderStatus::Pending, OrderStatus::Processing, OrderStatus::Failed] {
            assert!(!OrderStatus::Paid.can_transition_to(next));
        }
        assert!(OrderStatus::Paid.can_transition_to(OrderStatus::Refunded));
    }

    #[test]
    fn nothing_leads_back_to_pending() {
        use OrderStatus::*;
        for from in [Pending, Processing, Paid, Failed, Cancelled, Refunded] {
            assert!(!from.can_transition_to(Pending), "{from} -> pending");
        }
    }

    #[test]
    fn failed_and_cancelled_have_no_exits() {
        use OrderStatus::*;
        for next in [Pending, Processing, Paid, Failed, Cancelled, Refunded] {
            assert!(!Failed.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn unknown_item_kind_is_rejected() {
        assert!(matches!(
            "bundle".parse::<ItemKind>(),
            Err(AppError::BadRequest(_))
        ));
        assert_eq!("course".parse::<ItemKind>().ok(), Some(ItemKind::Course));
    }
}
