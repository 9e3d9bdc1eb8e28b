use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::SqlitePool;
use tracing::info;

use crate::catalog::repo_types::{HANDLE_SIZE_CUSTOM, HANDLE_SIZE_NONE};

struct SeedMaterial {
    name: &'static str,
    price_per_m3: Decimal,
    category: &'static str,
    is_water_resistant: bool,
}

struct SeedHandle {
    name: &'static str,
    size: i64,
    price: Decimal,
}

struct SeedHinge {
    name: &'static str,
    kind: &'static str,
    price: Decimal,
}

fn default_materials() -> [SeedMaterial; 5] {
    [
        SeedMaterial {
            name: "Tammi Luonnonvalkoinen",
            price_per_m3: dec!(0.40),
            category: "Laminaatti",
            is_water_resistant: false,
        },
        SeedMaterial {
            name: "Tammi Savu",
            price_per_m3: dec!(0.8),
            category: "Laminaatti",
            is_water_resistant: false,
        },
        SeedMaterial {
            name: "Puhdas valkoinen",
            price_per_m3: dec!(0.75),
            category: "Laminaatti",
            is_water_resistant: false,
        },
        SeedMaterial {
            name: "MDF Valkoinen maalattu",
            price_per_m3: dec!(0.50),
            category: "MDF",
            is_water_resistant: false,
        },
        SeedMaterial {
            name: "Kosteussuojattu laminaatti",
            price_per_m3: dec!(0.45),
            category: "Laminaatti",
            is_water_resistant: true,
        },
    ]
}

fn default_handles() -> [SeedHandle; 4] {
    [
        SeedHandle {
            name: "Ei kahvaa",
            size: HANDLE_SIZE_NONE,
            price: dec!(0),
        },
        SeedHandle {
            name: "96mm kahva",
            size: 96,
            price: dec!(8.50),
        },
        SeedHandle {
            name: "128mm kahva",
            size: 128,
            price: dec!(11.75),
        },
        SeedHandle {
            name: "Oma koko",
            size: HANDLE_SIZE_CUSTOM,
            price: dec!(0),
        },
    ]
}

fn default_hinges() -> [SeedHinge; 4] {
    [
        SeedHinge {
            name: "Ei saranaa",
            kind: "Ei jyrsintää",
            price: dec!(0),
        },
        SeedHinge {
            name: "Salice 110' upposarana",
            kind: "Jyrsintä",
            price: dec!(14.20),
        },
        SeedHinge {
            name: "Salice saneeraus",
            kind: "Ei jyrsintää",
            price: dec!(11.80),
        },
        SeedHinge {
            name: "Blum CLIP top",
            kind: "Jyrsintä",
            price: dec!(17.50),
        },
    ]
}

async fn table_is_empty(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    table: &str,
) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(&mut **tx)
        .await?;
    Ok(count == 0)
}

/// Insert the default catalog into every catalog table that has no rows.
/// Tables that already hold data are left untouched, so this runs on every
/// startup.
pub async fn seed_if_empty(db: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut tx = db.begin().await?;

    if table_is_empty(&mut tx, "materials").await? {
        for m in default_materials() {
            sqlx::query(
                "INSERT INTO materials (name, price_per_m3, category, is_water_resistant) \
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(m.name)
            .bind(m.price_per_m3.to_string())
            .bind(m.category)
            .bind(m.is_water_resistant)
            .execute(&mut *tx)
            .await?;
        }
        info!(table = "materials", "seeded default catalog");
    }

    if table_is_empty(&mut tx, "handles").await? {
        for h in default_handles() {
            sqlx::query("INSERT INTO handles (name, size, price) VALUES (?1, ?2, ?3)")
                .bind(h.name)
                .bind(h.size)
                .bind(h.price.to_string())
                .execute(&mut *tx)
                .await?;
        }
        info!(table = "handles", "seeded default catalog");
    }

    if table_is_empty(&mut tx, "hinges").await? {
        for h in default_hinges() {
            sqlx::query("INSERT INTO hinges (name, type, price) VALUES (?1, ?2, ?3)")
                .bind(h.name)
                .bind(h.kind)
                .bind(h.price.to_string())
                .execute(&mut *tx)
                .await?;
        }
        info!(table = "hinges", "seeded default catalog");
    }

    tx.commit().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn counts(db: &SqlitePool) -> (i64, i64, i64) {
        let q = |t: &'static str| format!("SELECT COUNT(*) FROM {t}");
        let m: i64 = sqlx::query_scalar(&q("materials")).fetch_one(db).await.unwrap();
        let h: i64 = sqlx::query_scalar(&q("handles")).fetch_one(db).await.unwrap();
        let g: i64 = sqlx::query_scalar(&q("hinges")).fetch_one(db).await.unwrap();
        (m, h, g)
    }

    #[tokio::test]
    async fn fresh_store_gets_default_catalog() {
        let tmp = tempfile::tempdir().unwrap();
        let db = Database::new(tmp.path().join("seed.db"), 1);
        let pool = db.pool().await.unwrap();
        assert_eq!(counts(pool).await, (5, 4, 4));
    }

    #[tokio::test]
    async fn seeding_twice_does_not_duplicate() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("seed.db");

        let first = Database::new(&path, 1);
        let pool = first.pool().await.unwrap();
        seed_if_empty(pool).await.unwrap();
        assert_eq!(counts(pool).await, (5, 4, 4));
        first.close().await;

        let reopened = Database::new(&path, 1);
        let pool = reopened.pool().await.unwrap();
        assert_eq!(counts(pool).await, (5, 4, 4));
    }

    #[tokio::test]
    async fn only_empty_tables_are_seeded() {
        let tmp = tempfile::tempdir().unwrap();
        let db = Database::new(tmp.path().join("seed.db"), 1);
        let pool = db.pool().await.unwrap();

        sqlx::query("DELETE FROM hinges").execute(pool).await.unwrap();
        sqlx::query("DELETE FROM materials WHERE id > 1").execute(pool).await.unwrap();
        seed_if_empty(pool).await.unwrap();

        assert_eq!(counts(pool).await, (1, 4, 4));
    }
}
