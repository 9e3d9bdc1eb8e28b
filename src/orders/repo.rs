use sqlx::{Executor, Sqlite, SqlitePool};

use crate::orders::dto::OrderItemDetailRow;
use crate::orders::repo_types::{Order, OrderItem, OrderItemRow, OrderRow, OrderStatus};

const ORDER_COLUMNS: &str = "id, user_id, total_cost, status, created_date, \
    customer_name_encrypted, customer_email_encrypted, customer_phone_encrypted";

const ITEM_COLUMNS: &str = "id, order_id, room, cabinet_type, front_type, width, height, \
    thickness, handedness, material_id, handle_id, hinge_id, cost, created_date";

// ---- Orders ----

pub async fn insert_order<'e, E>(db: E, order: &Order) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(
        r#"
        INSERT INTO orders (user_id, total_cost, status, created_date, customer_name_encrypted,
                            customer_email_encrypted, customer_phone_encrypted)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(order.user_id)
    .bind(order.total_cost.to_string())
    .bind(order.status.as_str())
    .bind(order.created_date)
    .bind(&order.customer_name_encrypted)
    .bind(&order.customer_email_encrypted)
    .bind(&order.customer_phone_encrypted)
    .execute(db)
    .await?;
    Ok(res.last_insert_rowid())
}

pub async fn update_order<'e, E>(db: E, order: &Order) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(
        r#"
        UPDATE orders
           SET user_id = ?1,
               total_cost = ?2,
               status = ?3,
               customer_name_encrypted = ?4,
               customer_email_encrypted = ?5,
               customer_phone_encrypted = ?6
         WHERE id = ?7
        "#,
    )
    .bind(order.user_id)
    .bind(order.total_cost.to_string())
    .bind(order.status.as_str())
    .bind(&order.customer_name_encrypted)
    .bind(&order.customer_email_encrypted)
    .bind(&order.customer_phone_encrypted)
    .bind(order.id)
    .execute(db)
    .await?;
    Ok(res.rows_affected())
}

pub async fn update_status(
    db: &SqlitePool,
    order_id: i64,
    status: OrderStatus,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("UPDATE orders SET status = ?1 WHERE id = ?2")
        .bind(status.as_str())
        .bind(order_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}

/// Overwrite the encrypted contact columns of every order owned by `user_id`.
pub async fn replace_contact_for_user<'e, E>(
    db: E,
    user_id: i64,
    name_token: &str,
    email_token: &str,
    phone_token: &str,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(
        r#"
        UPDATE orders
           SET customer_name_encrypted = ?1,
               customer_email_encrypted = ?2,
               customer_phone_encrypted = ?3
         WHERE user_id = ?4
        "#,
    )
    .bind(name_token)
    .bind(email_token)
    .bind(phone_token)
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(res.rows_affected())
}

pub async fn get_order(db: &SqlitePool, id: i64) -> Result<Option<OrderRow>, sqlx::Error> {
    sqlx::query_as::<_, OrderRow>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn list_by_user(db: &SqlitePool, user_id: i64) -> Result<Vec<OrderRow>, sqlx::Error> {
    sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ?1 ORDER BY id"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn list_all(db: &SqlitePool) -> Result<Vec<OrderRow>, sqlx::Error> {
    sqlx::query_as::<_, OrderRow>(&format!("SELECT {ORDER_COLUMNS} FROM orders"))
        .fetch_all(db)
        .await
}

pub async fn delete_order<'e, E>(db: E, order_id: i64) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query("DELETE FROM orders WHERE id = ?1")
        .bind(order_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}

// ---- Order items ----

pub async fn insert_item<'e, E>(db: E, item: &OrderItem) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(
        r#"
        INSERT INTO order_items (order_id, room, cabinet_type, front_type, width, height, thickness,
                                 handedness, material_id, handle_id, hinge_id, cost, created_date)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
    )
    .bind(item.order_id)
    .bind(&item.room)
    .bind(&item.cabinet_type)
    .bind(&item.front_type)
    .bind(item.width)
    .bind(item.height)
    .bind(item.thickness)
    .bind(&item.handedness)
    .bind(item.material_id)
    .bind(item.handle_id)
    .bind(item.hinge_id)
    .bind(item.cost.to_string())
    .bind(item.created_date)
    .execute(db)
    .await?;
    Ok(res.last_insert_rowid())
}

pub async fn update_item<'e, E>(db: E, item: &OrderItem) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(
        r#"
        UPDATE order_items
           SET order_id = ?1, room = ?2, cabinet_type = ?3, front_type = ?4,
               width = ?5, height = ?6, thickness = ?7, handedness = ?8,
               material_id = ?9, handle_id = ?10, hinge_id = ?11, cost = ?12
         WHERE id = ?13
        "#,
    )
    .bind(item.order_id)
    .bind(&item.room)
    .bind(&item.cabinet_type)
    .bind(&item.front_type)
    .bind(item.width)
    .bind(item.height)
    .bind(item.thickness)
    .bind(&item.handedness)
    .bind(item.material_id)
    .bind(item.handle_id)
    .bind(item.hinge_id)
    .bind(item.cost.to_string())
    .bind(item.id)
    .execute(db)
    .await?;
    Ok(res.rows_affected())
}

pub async fn list_items(db: &SqlitePool, order_id: i64) -> Result<Vec<OrderItemRow>, sqlx::Error> {
    sqlx::query_as::<_, OrderItemRow>(&format!(
        "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ?1 ORDER BY id"
    ))
    .bind(order_id)
    .fetch_all(db)
    .await
}

/// Items of an order with catalog names; missing catalog rows yield ''.
pub async fn list_item_details(
    db: &SqlitePool,
    order_id: i64,
) -> Result<Vec<OrderItemDetailRow>, sqlx::Error> {
    sqlx::query_as::<_, OrderItemDetailRow>(
        r#"
        SELECT oi.id, oi.order_id, oi.room, oi.cabinet_type, oi.front_type,
               oi.width, oi.height, oi.thickness, oi.handedness,
               COALESCE(m.name, '')   AS material_name,
               COALESCE(h.name, '')   AS handle_name,
               COALESCE(hin.name, '') AS hinge_name,
               oi.cost, oi.created_date
          FROM order_items oi
          LEFT JOIN materials m ON oi.material_id = m.id
          LEFT JOIN handles h   ON oi.handle_id = h.id
          LEFT JOIN hinges hin  ON oi.hinge_id = hin.id
         WHERE oi.order_id = ?1
         ORDER BY oi.id
        "#,
    )
    .bind(order_id)
    .fetch_all(db)
    .await
}

pub async fn delete_items<'e, E>(db: E, order_id: i64) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query("DELETE FROM order_items WHERE order_id = ?1")
        .bind(order_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}
