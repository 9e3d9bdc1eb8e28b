use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// Dashboard counters. `Default` is the all-zero record shown when the
/// store cannot be read.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdminStatistics {
    pub total_orders: i64,
    pub new_orders: i64,
    pub total_revenue: Decimal,
    pub total_users: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialStats {
    pub material_name: String,
    pub usage_count: i64,
    pub total_revenue: Decimal,
}

#[derive(Debug, FromRow)]
pub(crate) struct OrderTotalRow {
    pub id: i64,
    pub status: String,
    pub total_cost: String,
}

#[derive(Debug, FromRow)]
pub(crate) struct MaterialUsageRow {
    pub item_id: i64,
    pub material_name: String,
    pub cost: String,
}
