use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::{error, instrument};

use super::repo;
use crate::auth::count_users;
use crate::db::decode_decimal;
use crate::error::StoreResult;
use crate::orders::OrderStatus;
use crate::reports::dto::{AdminStatistics, MaterialStats};
use crate::state::AppState;

pub const DEFAULT_POPULAR_LIMIT: usize = 10;

/// Order counts and revenue summed exactly over every order.
pub async fn try_admin_statistics(st: &AppState) -> StoreResult<AdminStatistics> {
    let db = st.pool().await?;
    let mut stats = AdminStatistics::default();
    for row in repo::order_totals(db).await? {
        stats.total_orders += 1;
        if row.status == OrderStatus::New.as_str() {
            stats.new_orders += 1;
        }
        stats.total_revenue += decode_decimal("order", row.id, &row.total_cost)?;
    }
    stats.total_users = count_users(db).await?;
    Ok(stats)
}

/// Like [`try_admin_statistics`] but zeroed when the store fails.
#[instrument(skip(st))]
pub async fn admin_statistics(st: &AppState) -> AdminStatistics {
    match try_admin_statistics(st).await {
        Ok(stats) => stats,
        Err(e) => {
            error!(error = %e, "admin statistics failed");
            AdminStatistics::default()
        }
    }
}

/// Materials ranked by how many order lines use them, most used first.
/// Equal counts are ordered by name.
#[instrument(skip(st))]
pub async fn get_popular_materials(st: &AppState, limit: usize) -> StoreResult<Vec<MaterialStats>> {
    let db = st.pool().await?;
    let mut by_name: HashMap<String, (i64, Decimal)> = HashMap::new();
    for row in repo::material_usage(db).await? {
        let cost = decode_decimal("order item", row.item_id, &row.cost)?;
        let entry = by_name.entry(row.material_name).or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += cost;
    }

    let mut stats: Vec<MaterialStats> = by_name
        .into_iter()
        .map(|(material_name, (usage_count, total_revenue))| MaterialStats {
            material_name,
            usage_count,
            total_revenue,
        })
        .collect();
    stats.sort_by(|a, b| {
        b.usage_count
            .cmp(&a.usage_count)
            .then_with(|| a.material_name.cmp(&b.material_name))
    });
    stats.truncate(limit);
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::User;
    use crate::auth::services::save_user;
    use crate::orders::repo_types::{Order, OrderItem};
    use crate::orders::services::{save_order, save_order_item, update_order_status};
    use crate::state::test_state;
    use rust_decimal_macros::dec;
    use time::OffsetDateTime;

    fn line(order_id: i64, material_id: i64, cost: Decimal) -> OrderItem {
        OrderItem {
            id: 0,
            order_id,
            room: "Kylpyhuone".into(),
            cabinet_type: "Yläkaappi".into(),
            front_type: "Ovi".into(),
            width: 400,
            height: 600,
            thickness: 18,
            handedness: "Oikea".into(),
            material_id,
            handle_id: 1,
            hinge_id: 1,
            cost,
            created_date: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn empty_store_has_zeroed_statistics() {
        let (_tmp, st) = test_state();
        let stats = try_admin_statistics(&st).await.unwrap();
        assert_eq!(stats, AdminStatistics::default());
        assert_eq!(stats.total_revenue, Decimal::ZERO);
        assert_eq!(admin_statistics(&st).await, AdminStatistics::default());
        assert!(get_popular_materials(&st, DEFAULT_POPULAR_LIMIT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn statistics_count_orders_revenue_and_users() {
        let (_tmp, st) = test_state();
        let a = save_order(&st, &mut Order::new(0, dec!(25.81))).await.unwrap();
        save_order(&st, &mut Order::new(0, dec!(10.10))).await.unwrap();
        save_order(&st, &mut Order::new(0, dec!(0.09))).await.unwrap();
        update_order_status(&st, a, OrderStatus::Delivered).await.unwrap();

        let hash = st.hasher.hash("pw").unwrap();
        save_user(&st, &mut User::new("a@example.fi", "A", hash)).await.unwrap();

        let stats = admin_statistics(&st).await;
        assert_eq!(stats.total_orders, 3);
        assert_eq!(stats.new_orders, 2);
        assert_eq!(stats.total_revenue, dec!(36.00));
        assert_eq!(stats.total_users, 1);
    }

    #[tokio::test]
    async fn corrupt_total_is_reported_by_try_variant_only() {
        let (_tmp, st) = test_state();
        save_order(&st, &mut Order::new(0, dec!(1))).await.unwrap();
        let db = st.pool().await.unwrap();
        sqlx::query("UPDATE orders SET total_cost = 'lots'")
            .execute(db)
            .await
            .unwrap();

        assert!(try_admin_statistics(&st).await.is_err());
        assert_eq!(admin_statistics(&st).await, AdminStatistics::default());
    }

    #[tokio::test]
    async fn popular_materials_ranked_by_usage() {
        let (_tmp, st) = test_state();
        let order = save_order(&st, &mut Order::new(0, dec!(0))).await.unwrap();
        for (material, cost) in [
            (3, dec!(10.00)),
            (1, dec!(5.50)),
            (3, dec!(12.25)),
            (2, dec!(7.00)),
            (3, dec!(1.00)),
            (1, dec!(4.50)),
            (404, dec!(99.00)),
        ] {
            save_order_item(&st, &mut line(order, material, cost)).await.unwrap();
        }

        let ranked = get_popular_materials(&st, DEFAULT_POPULAR_LIMIT).await.unwrap();
        let names: Vec<&str> = ranked.iter().map(|m| m.material_name.as_str()).collect();
        assert_eq!(names, vec!["Puhdas valkoinen", "Tammi Luonnonvalkoinen", "Tammi Savu"]);
        assert_eq!(ranked[0].usage_count, 3);
        assert_eq!(ranked[0].total_revenue, dec!(23.25));
        assert_eq!(ranked[1].usage_count, 2);
        assert_eq!(ranked[1].total_revenue, dec!(10.00));

        let top = get_popular_materials(&st, 1).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].material_name, "Puhdas valkoinen");
    }
}
