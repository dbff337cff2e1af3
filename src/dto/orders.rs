use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Order, OrderItem, OrderStatus};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub apartment: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    pub country: Option<String>,
    #[serde(default)]
    pub notes: String,
    pub terms_accepted: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentRedirect {
    pub order_id: uuid::Uuid,
    pub authority: String,
    pub payment_url: String,
}

/// Query the gateway appends to the callback URL.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentCallbackQuery {
    #[serde(rename = "Authority")]
    pub authority: Option<String>,
    #[serde(rename = "Status")]
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PaymentOutcome {
    Paid { ref_id: String },
    Cancelled,
    Failed { message: String },
    AlreadyFinalized { status: OrderStatus },
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentResult {
    pub order: Order,
    pub outcome: PaymentOutcome,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}
