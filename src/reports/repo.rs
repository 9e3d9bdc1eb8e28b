use sqlx::SqlitePool;

use crate::reports::dto::{MaterialUsageRow, OrderTotalRow};

pub async fn order_totals(db: &SqlitePool) -> Result<Vec<OrderTotalRow>, sqlx::Error> {
    sqlx::query_as::<_, OrderTotalRow>("SELECT id, status, total_cost FROM orders")
        .fetch_all(db)
        .await
}

/// One row per order item whose material still exists in the catalog.
pub async fn material_usage(db: &SqlitePool) -> Result<Vec<MaterialUsageRow>, sqlx::Error> {
    sqlx::query_as::<_, MaterialUsageRow>(
        r#"
        SELECT oi.id AS item_id, m.name AS material_name, oi.cost
          FROM order_items oi
          JOIN materials m ON oi.material_id = m.id
        "#,
    )
    .fetch_all(db)
    .await
}
