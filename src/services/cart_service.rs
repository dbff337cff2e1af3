use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait, sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{
    audit,
    catalog::{self, Priceable},
    dto::cart::CartSummary,
    entity::{
        cart_items::{ActiveModel as CartItemActive, Column as CartItemCol, Entity as CartItems},
        carts::{ActiveModel as CartActive, Column as CartCol, Entity as Carts, Model as CartModel},
    },
    error::{AppError, AppResult},
    models::ItemRef,
    session::{CartUpdate, SessionCart},
};

/// Put an item into the session cart.
///
/// The item must exist and be purchasable. Adding an item that is already in the cart
/// is a no-op and reports `false`.
pub async fn add_item<C: ConnectionTrait>(
    conn: &C,
    cart: &mut SessionCart,
    item: ItemRef,
) -> AppResult<CartUpdate<bool>> {
    let resolved = catalog::resolve(conn, item).await?;
    match resolved {
        Some(found) if found.is_purchasable() => {}
        _ => {
            return Err(AppError::BadRequest(
                "item not found or not available".to_string(),
            ));
        }
    }

    let added = cart.insert(item);
    Ok(CartUpdate::new(added, added))
}

pub fn remove_item(cart: &mut SessionCart, item: &ItemRef) -> CartUpdate<bool> {
    let removed = cart.remove(item);
    CartUpdate::new(removed, removed)
}

pub fn clear(cart: &mut SessionCart) -> CartUpdate<()> {
    let changed = cart.clear();
    CartUpdate::new((), changed)
}

/// Resolve every entry against the live catalog and price it.
///
/// Entries whose item was deleted or deactivated are dropped from the cart on the way.
pub async fn list_items<C: ConnectionTrait>(
    conn: &C,
    cart: &mut SessionCart,
) -> AppResult<CartUpdate<CartSummary>> {
    let mut lines = Vec::with_capacity(cart.len());
    let mut stale = Vec::new();

    for item in cart.items() {
        match catalog::resolve(conn, *item).await? {
            Some(found) => lines.push(found.to_cart_line()),
            None => stale.push(*item),
        }
    }

    for item in &stale {
        tracing::debug!(kind = %item.kind, id = %item.id, "dropping stale cart entry");
        cart.remove(item);
    }

    let total_price = lines.iter().map(|line| line.price).sum();
    let summary = CartSummary {
        total_quantity: lines.len(),
        total_price,
        items: lines,
    };
    Ok(CartUpdate::new(summary, !stale.is_empty()))
}

pub async fn total_quantity<C: ConnectionTrait>(
    conn: &C,
    cart: &mut SessionCart,
) -> AppResult<CartUpdate<usize>> {
    let listed = list_items(conn, cart).await?;
    Ok(CartUpdate::new(listed.value.total_quantity, listed.dirty))
}

/// Merge the session cart with the user's durable cart after login.
///
/// Durable-only items are copied into the session, then the durable cart is rewritten
/// to equal the merged session cart. Returns the number of items after the merge.
pub async fn reconcile(
    conn: &DatabaseConnection,
    cart: &mut SessionCart,
    user_id: Uuid,
) -> AppResult<CartUpdate<usize>> {
    let txn = conn.begin().await?;
    let durable = fetch_or_create_cart(&txn, user_id).await?;

    let mut pulled = 0usize;
    let lines = CartItems::find()
        .filter(CartItemCol::CartId.eq(durable.id))
        .all(&txn)
        .await?;
    for line in lines {
        let Ok(kind) = line.item_kind.parse() else {
            tracing::warn!(kind = %line.item_kind, "skipping durable cart line with unknown kind");
            continue;
        };
        if cart.insert(ItemRef { kind, id: line.item_id }) {
            pulled += 1;
        }
    }

    push_lines(&txn, &durable, cart).await?;
    txn.commit().await?;

    tracing::info!(%user_id, pulled, items = cart.len(), "cart reconciled");
    audit::record(
        conn,
        Some(user_id),
        "cart_reconcile",
        "carts",
        serde_json::json!({ "pulled": pulled, "items": cart.len() }),
    )
    .await;

    Ok(CartUpdate::new(cart.len(), pulled > 0))
}

/// Make the durable cart equal to the session cart. Session-only items are added and
/// durable-only items are deleted; nothing flows back into the session.
pub async fn sync_durable_cart(
    conn: &DatabaseConnection,
    cart: &SessionCart,
    user_id: Uuid,
) -> AppResult<()> {
    let txn = conn.begin().await?;
    let durable = fetch_or_create_cart(&txn, user_id).await?;
    push_lines(&txn, &durable, cart).await?;
    txn.commit().await?;
    Ok(())
}

/// Remove every durable line of the user, keeping the cart row itself.
pub async fn clear_durable_cart<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<()> {
    let durable = Carts::find()
        .filter(CartCol::UserId.eq(user_id))
        .one(conn)
        .await?;
    if let Some(durable) = durable {
        CartItems::delete_many()
            .filter(CartItemCol::CartId.eq(durable.id))
            .exec(conn)
            .await?;
    }
    Ok(())
}

/// Items currently stored in the user's durable cart.
pub async fn durable_items<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<Vec<ItemRef>> {
    let Some(durable) = Carts::find()
        .filter(CartCol::UserId.eq(user_id))
        .one(conn)
        .await?
    else {
        return Ok(Vec::new());
    };

    let lines = CartItems::find()
        .filter(CartItemCol::CartId.eq(durable.id))
        .all(conn)
        .await?;
    Ok(lines
        .into_iter()
        .filter_map(|line| {
            let kind = line.item_kind.parse().ok()?;
            Some(ItemRef { kind, id: line.item_id })
        })
        .collect())
}

async fn fetch_or_create_cart<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<CartModel> {
    let now = Utc::now();
    Carts::insert(CartActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    })
    .on_conflict(OnConflict::column(CartCol::UserId).do_nothing().to_owned())
    .exec_without_returning(conn)
    .await?;

    Carts::find()
        .filter(CartCol::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("durable cart missing after upsert")))
}

async fn push_lines<C: ConnectionTrait>(
    conn: &C,
    durable: &CartModel,
    cart: &SessionCart,
) -> AppResult<()> {
    let existing = CartItems::find()
        .filter(CartItemCol::CartId.eq(durable.id))
        .all(conn)
        .await?;

    let wanted: HashSet<(String, Uuid)> = cart
        .items()
        .iter()
        .map(|item| (item.kind.as_str().to_string(), item.id))
        .collect();
    let present: HashSet<(String, Uuid)> = existing
        .iter()
        .map(|line| (line.item_kind.clone(), line.item_id))
        .collect();

    let now = Utc::now();
    for item in cart.items() {
        if present.contains(&(item.kind.as_str().to_string(), item.id)) {
            continue;
        }
        CartItems::insert(CartItemActive {
            id: Set(Uuid::new_v4()),
            cart_id: Set(durable.id),
            item_kind: Set(item.kind.as_str().to_string()),
            item_id: Set(item.id),
            created_at: Set(now.into()),
        })
        .on_conflict(
            OnConflict::columns([CartItemCol::CartId, CartItemCol::ItemKind, CartItemCol::ItemId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    }

    let obsolete: Vec<Uuid> = existing
        .iter()
        .filter(|line| !wanted.contains(&(line.item_kind.clone(), line.item_id)))
        .map(|line| line.id)
        .collect();
    if !obsolete.is_empty() {
        CartItems::delete_many()
            .filter(CartItemCol::Id.is_in(obsolete))
            .exec(conn)
            .await?;
    }

    Ok(())
}
