use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{CartLine, ItemKind};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub item_kind: ItemKind,
    pub item_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddToCartResponse {
    pub added: bool,
    pub cart_quantity: usize,
    pub cart_total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartSummary {
    pub items: Vec<CartLine>,
    pub total_quantity: usize,
    pub total_price: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartCount {
    pub cart_quantity: usize,
    pub cart_total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InCart {
    pub in_cart: bool,
}
