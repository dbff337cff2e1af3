//! Catalog lookups used by the cart and the checkout.
//!
//! Courses and products live in separate tables; `ItemRef` selects the resolver and the
//! resolved `CatalogItem` exposes what the cart needs through `Priceable`.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::{
    entity::{
        courses::{self, Entity as Courses},
        products::{self, Entity as Products},
    },
    error::AppResult,
    models::{CartLine, ItemKind, ItemRef},
};

/// Something that can be sold through the cart.
pub trait Priceable {
    fn title(&self) -> &str;

    /// Current selling price after the item's own discount rules.
    fn effective_price(&self) -> i64;

    /// Whether a visitor may put the item into the cart right now.
    fn is_purchasable(&self) -> bool;
}

impl Priceable for courses::Model {
    fn title(&self) -> &str {
        &self.title
    }

    fn effective_price(&self) -> i64 {
        self.price
    }

    fn is_purchasable(&self) -> bool {
        self.is_active
    }
}

impl Priceable for products::Model {
    fn title(&self) -> &str {
        &self.title
    }

    fn effective_price(&self) -> i64 {
        if self.is_free {
            return 0;
        }
        match self.discounted_price {
            Some(discounted) if discounted > 0 && discounted < self.price => discounted,
            _ => self.price,
        }
    }

    fn is_purchasable(&self) -> bool {
        self.is_active && self.stock > 0
    }
}

#[derive(Debug, Clone)]
pub enum CatalogItem {
    Course(courses::Model),
    Product(products::Model),
}

impl CatalogItem {
    pub fn item_ref(&self) -> ItemRef {
        match self {
            CatalogItem::Course(course) => ItemRef::course(course.id),
            CatalogItem::Product(product) => ItemRef::product(product.id),
        }
    }

    pub fn to_cart_line(&self) -> CartLine {
        let item = self.item_ref();
        CartLine {
            item_kind: item.kind,
            item_id: item.id,
            title: self.title().to_string(),
            price: self.effective_price(),
            quantity: 1,
        }
    }
}

impl Priceable for CatalogItem {
    fn title(&self) -> &str {
        match self {
            CatalogItem::Course(course) => course.title(),
            CatalogItem::Product(product) => product.title(),
        }
    }

    fn effective_price(&self) -> i64 {
        match self {
            CatalogItem::Course(course) => course.effective_price(),
            CatalogItem::Product(product) => product.effective_price(),
        }
    }

    fn is_purchasable(&self) -> bool {
        match self {
            CatalogItem::Course(course) => course.is_purchasable(),
            CatalogItem::Product(product) => product.is_purchasable(),
        }
    }
}

/// Look up an active item. Deleted and deactivated items resolve to `None`.
pub async fn resolve<C: ConnectionTrait>(conn: &C, item: ItemRef) -> AppResult<Option<CatalogItem>> {
    let resolved = match item.kind {
        ItemKind::Course => resolve_course(conn, item).await?.map(CatalogItem::Course),
        ItemKind::Product => resolve_product(conn, item).await?.map(CatalogItem::Product),
    };
    Ok(resolved)
}

async fn resolve_course<C: ConnectionTrait>(
    conn: &C,
    item: ItemRef,
) -> AppResult<Option<courses::Model>> {
    let course = Courses::find_by_id(item.id)
        .filter(courses::Column::IsActive.eq(true))
        .one(conn)
        .await?;
    Ok(course)
}

async fn resolve_product<C: ConnectionTrait>(
    conn: &C,
    item: ItemRef,
) -> AppResult<Option<products::Model>> {
    let product = Products::find_by_id(item.id)
        .filter(products::Column::IsActive.eq(true))
        .one(conn)
        .await?;
    Ok(product)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn product(price: i64, discounted_price: Option<i64>, is_free: bool) -> products::Model {
        let now = Utc::now().into();
        products::Model {
            id: Uuid::new_v4(),
            title: "Rust book".into(),
            slug: "rust-book".into(),
            description: String::new(),
            price,
            discounted_price,
            is_free,
            stock: 3,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn product_price_uses_lower_discount_only() {
        assert_eq!(product(1000, Some(800), false).effective_price(), 800);
        assert_eq!(product(1000, Some(1200), false).effective_price(), 1000);
        assert_eq!(product(1000, None, false).effective_price(), 1000);
        assert_eq!(product(1000, Some(800), true).effective_price(), 0);
    }

    #[test]
    fn zero_discount_falls_back_to_list_price() {
        assert_eq!(product(1000, Some(0), false).effective_price(), 1000);
    }

    #[test]
    fn out_of_stock_product_is_not_purchasable() {
        let mut p = product(1000, None, false);
        p.stock = 0;
        assert!(!p.is_purchasable());
    }
}
