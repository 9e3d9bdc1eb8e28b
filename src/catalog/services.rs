use tracing::instrument;

use super::repo;
use crate::catalog::repo_types::{Handle, Hinge, Material};
use crate::error::StoreResult;
use crate::state::AppState;

#[instrument(skip(st))]
pub async fn list_materials(st: &AppState) -> StoreResult<Vec<Material>> {
    let db = st.pool().await?;
    repo::list_materials(db)
        .await?
        .into_iter()
        .map(Material::try_from)
        .collect()
}

#[instrument(skip(st))]
pub async fn list_handles(st: &AppState) -> StoreResult<Vec<Handle>> {
    let db = st.pool().await?;
    repo::list_handles(db)
        .await?
        .into_iter()
        .map(Handle::try_from)
        .collect()
}

#[instrument(skip(st))]
pub async fn list_hinges(st: &AppState) -> StoreResult<Vec<Hinge>> {
    let db = st.pool().await?;
    repo::list_hinges(db)
        .await?
        .into_iter()
        .map(Hinge::try_from)
        .collect()
}

pub async fn get_material_by_id(st: &AppState, id: i64) -> StoreResult<Option<Material>> {
    let db = st.pool().await?;
    repo::get_material(db, id).await?.map(Material::try_from).transpose()
}

pub async fn get_handle_by_id(st: &AppState, id: i64) -> StoreResult<Option<Handle>> {
    let db = st.pool().await?;
    repo::get_handle(db, id).await?.map(Handle::try_from).transpose()
}

pub async fn get_hinge_by_id(st: &AppState, id: i64) -> StoreResult<Option<Hinge>> {
    let db = st.pool().await?;
    repo::get_hinge(db, id).await?.map(Hinge::try_from).transpose()
}
