//! Per-visitor state kept in the session store.
//!
//! Handlers load these values at the start of a request, pass them by `&mut` into the
//! services and write them back only when the service reports a change.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use crate::{error::AppResult, middleware::auth::AuthUser, models::ItemRef};

pub const CART_KEY: &str = "cart";
pub const COUPON_KEY: &str = "coupon";
pub const AUTH_USER_KEY: &str = "auth_user";

/// Items a visitor selected in this session. Each item appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCart {
    items: Vec<ItemRef>,
}

impl SessionCart {
    pub fn from_items(items: impl IntoIterator<Item = ItemRef>) -> Self {
        let mut cart = Self::default();
        for item in items {
            cart.insert(item);
        }
        cart
    }

    pub fn items(&self) -> &[ItemRef] {
        &self.items
    }

    pub fn contains(&self, item: &ItemRef) -> bool {
        self.items.contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `false` when the item was already present.
    pub fn insert(&mut self, item: ItemRef) -> bool {
        if self.contains(&item) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Returns `true` when an entry was removed.
    pub fn remove(&mut self, item: &ItemRef) -> bool {
        let before = self.items.len();
        self.items.retain(|entry| entry != item);
        self.items.len() != before
    }

    /// Returns `true` when the cart held anything.
    pub fn clear(&mut self) -> bool {
        let had_items = !self.items.is_empty();
        self.items.clear();
        had_items
    }
}

/// Coupon validated against the cart but not yet redeemed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedCoupon {
    pub coupon_id: Uuid,
    pub code: String,
    pub discount_amount: i64,
}

/// Result of a cart operation plus whether the session copy must be written back.
#[derive(Debug)]
pub struct CartUpdate<T> {
    pub value: T,
    pub dirty: bool,
}

impl<T> CartUpdate<T> {
    pub fn new(value: T, dirty: bool) -> Self {
        Self { value, dirty }
    }
}

pub async fn load_cart(session: &Session) -> AppResult<SessionCart> {
    Ok(session.get::<SessionCart>(CART_KEY).await?.unwrap_or_default())
}

pub async fn store_cart(session: &Session, cart: &SessionCart) -> AppResult<()> {
    session.insert(CART_KEY, cart).await?;
    Ok(())
}

pub async fn load_coupon(session: &Session) -> AppResult<Option<AppliedCoupon>> {
    Ok(session.get::<AppliedCoupon>(COUPON_KEY).await?)
}

pub async fn store_coupon(session: &Session, coupon: &AppliedCoupon) -> AppResult<()> {
    session.insert(COUPON_KEY, coupon).await?;
    Ok(())
}

pub async fn clear_coupon(session: &Session) -> AppResult<()> {
    session.remove::<AppliedCoupon>(COUPON_KEY).await?;
    Ok(())
}

pub async fn bind_user(session: &Session, user: &AuthUser) -> AppResult<()> {
    session.insert(AUTH_USER_KEY, user).await?;
    Ok(())
}

pub async fn unbind_user(session: &Session) -> AppResult<()> {
    session.remove::<AuthUser>(AUTH_USER_KEY).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_idempotent_per_kind_and_id() {
        let id = Uuid::new_v4();
        let mut cart = SessionCart::default();
        assert!(cart.insert(ItemRef::course(id)));
        assert!(!cart.insert(ItemRef::course(id)));
        // same id under a different kind is a different item
        assert!(cart.insert(ItemRef::product(id)));
        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn remove_missing_item_is_a_no_op() {
        let mut cart = SessionCart::from_items([ItemRef::course(Uuid::new_v4())]);
        assert!(!cart.remove(&ItemRef::course(Uuid::new_v4())));
        assert_eq!(cart.len(), 1);
        assert!(cart.clear());
        assert!(!cart.clear());
    }
}
