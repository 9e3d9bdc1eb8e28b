use sqlx::SqlitePool;

use crate::catalog::repo_types::{HandleRow, HingeRow, MaterialRow};

pub async fn list_materials(db: &SqlitePool) -> Result<Vec<MaterialRow>, sqlx::Error> {
    sqlx::query_as::<_, MaterialRow>(
        "SELECT id, name, price_per_m3, category, is_water_resistant FROM materials ORDER BY id",
    )
    .fetch_all(db)
    .await
}

pub async fn list_handles(db: &SqlitePool) -> Result<Vec<HandleRow>, sqlx::Error> {
    sqlx::query_as::<_, HandleRow>("SELECT id, name, size, price FROM handles ORDER BY id")
        .fetch_all(db)
        .await
}

pub async fn list_hinges(db: &SqlitePool) -> Result<Vec<HingeRow>, sqlx::Error> {
    sqlx::query_as::<_, HingeRow>("SELECT id, name, type, price FROM hinges ORDER BY id")
        .fetch_all(db)
        .await
}

pub async fn get_material(db: &SqlitePool, id: i64) -> Result<Option<MaterialRow>, sqlx::Error> {
    sqlx::query_as::<_, MaterialRow>(
        "SELECT id, name, price_per_m3, category, is_water_resistant FROM materials WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn get_handle(db: &SqlitePool, id: i64) -> Result<Option<HandleRow>, sqlx::Error> {
    sqlx::query_as::<_, HandleRow>("SELECT id, name, size, price FROM handles WHERE id = ?1")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn get_hinge(db: &SqlitePool, id: i64) -> Result<Option<HingeRow>, sqlx::Error> {
    sqlx::query_as::<_, HingeRow>("SELECT id, name, type, price FROM hinges WHERE id = ?1")
        .bind(id)
        .fetch_optional(db)
        .await
}
