use tracing::{error, info, instrument, warn};

use super::repo;
use crate::crypto::FieldCipher;
use crate::error::{StoreError, StoreResult};
use crate::orders::dto::{OrderDetails, OrderFilter, OrderItemDetail};
use crate::orders::repo_types::{Order, OrderItem, OrderStatus};
use crate::state::AppState;

fn seal_field(cipher: &FieldCipher, plain: &mut Option<String>, sealed: &mut String) {
    if !sealed.is_empty() {
        return;
    }
    if let Some(value) = plain.take().filter(|v| !v.is_empty()) {
        *sealed = cipher.encrypt(&value);
    }
}

/// Encrypt populated contact fields whose encrypted column is still empty,
/// clearing the plaintext.
pub(crate) fn seal_order(cipher: &FieldCipher, order: &mut Order) {
    seal_field(cipher, &mut order.customer_name, &mut order.customer_name_encrypted);
    seal_field(cipher, &mut order.customer_email, &mut order.customer_email_encrypted);
    seal_field(cipher, &mut order.customer_phone, &mut order.customer_phone_encrypted);
}

/// Insert or update an order. Returns its id; `order.id` is set after an
/// insert.
#[instrument(skip(st, order), fields(order_id = order.id))]
pub async fn save_order(st: &AppState, order: &mut Order) -> StoreResult<i64> {
    let db = st.pool().await?;
    seal_order(&st.cipher, order);
    if order.id != 0 {
        if repo::update_order(db, order).await? == 0 {
            warn!(order_id = order.id, "update of unknown order");
            return Err(StoreError::NotFound { entity: "order", id: order.id });
        }
        info!(order_id = order.id, "order updated");
    } else {
        order.id = repo::insert_order(db, order).await?;
        info!(order_id = order.id, user_id = order.user_id, "order created");
    }
    Ok(order.id)
}

/// Insert or update an order line. The cost is stored as given.
#[instrument(skip(st, item), fields(item_id = item.id, order_id = item.order_id))]
pub async fn save_order_item(st: &AppState, item: &mut OrderItem) -> StoreResult<i64> {
    let db = st.pool().await?;
    if item.id != 0 {
        if repo::update_item(db, item).await? == 0 {
            warn!(item_id = item.id, "update of unknown order item");
            return Err(StoreError::NotFound { entity: "order item", id: item.id });
        }
    } else {
        item.id = repo::insert_item(db, item).await?;
    }
    Ok(item.id)
}

pub async fn get_user_orders(st: &AppState, user_id: i64) -> StoreResult<Vec<Order>> {
    let db = st.pool().await?;
    repo::list_by_user(db, user_id)
        .await?
        .into_iter()
        .map(Order::try_from)
        .collect()
}

pub async fn get_order_by_id(st: &AppState, id: i64) -> StoreResult<Option<Order>> {
    let db = st.pool().await?;
    repo::get_order(db, id).await?.map(Order::try_from).transpose()
}

pub async fn get_order_items(st: &AppState, order_id: i64) -> StoreResult<Vec<OrderItem>> {
    let db = st.pool().await?;
    repo::list_items(db, order_id)
        .await?
        .into_iter()
        .map(OrderItem::try_from)
        .collect()
}

/// Orders matching `filter`, newest first.
pub async fn try_list_orders(st: &AppState, filter: &OrderFilter) -> StoreResult<Vec<Order>> {
    let db = st.pool().await?;
    let mut orders = repo::list_all(db)
        .await?
        .into_iter()
        .map(Order::try_from)
        .collect::<StoreResult<Vec<_>>>()?;
    orders.retain(|o| filter.matches(o));
    orders.sort_by(|a, b| {
        b.created_date
            .cmp(&a.created_date)
            .then_with(|| b.id.cmp(&a.id))
    });
    Ok(orders)
}

/// Like [`try_list_orders`] but yields an empty list when the store fails.
#[instrument(skip(st))]
pub async fn list_orders(st: &AppState, filter: &OrderFilter) -> Vec<Order> {
    match try_list_orders(st, filter).await {
        Ok(orders) => orders,
        Err(e) => {
            error!(error = %e, "list orders failed");
            Vec::new()
        }
    }
}

#[instrument(skip(st))]
pub async fn get_order_details(
    st: &AppState,
    order_id: i64,
) -> StoreResult<Option<OrderDetails>> {
    let Some(order) = get_order_by_id(st, order_id).await? else {
        return Ok(None);
    };
    let db = st.pool().await?;
    let items = repo::list_item_details(db, order_id)
        .await?
        .into_iter()
        .map(OrderItemDetail::try_from)
        .collect::<StoreResult<Vec<_>>>()?;
    Ok(Some(OrderDetails { order, items }))
}

/// Returns false when no order has this id.
#[instrument(skip(st))]
pub async fn update_order_status(
    st: &AppState,
    order_id: i64,
    status: OrderStatus,
) -> StoreResult<bool> {
    let db = st.pool().await?;
    let touched = repo::update_status(db, order_id, status).await?;
    if touched == 0 {
        warn!(order_id, "status update for unknown order");
        return Ok(false);
    }
    info!(order_id, status = %status, "order status updated");
    Ok(true)
}

/// Delete an order and its items in one transaction. Returns false when no
/// order has this id.
#[instrument(skip(st))]
pub async fn delete_order(st: &AppState, order_id: i64) -> StoreResult<bool> {
    let db = st.pool().await?;
    let mut tx = db.begin().await?;
    let items = repo::delete_items(&mut *tx, order_id).await?;
    let orders = repo::delete_order(&mut *tx, order_id).await?;
    tx.commit().await?;

    if orders == 0 {
        warn!(order_id, orphaned_items = items, "delete of unknown order");
        return Ok(false);
    }
    info!(order_id, items, "order deleted");
    Ok(true)
}
