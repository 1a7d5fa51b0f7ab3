use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{AppError, AppResult};
use crate::models::Material;
use crate::state::AppState;

pub async fn list_materials(State(state): State<AppState>) -> Json<Vec<Material>> {
    Json(state.store.list_materials())
}

pub async fn get_material(
    State(state): State<AppState>,
    Path(material_id): Path<i64>,
) -> AppResult<Json<Material>> {
    let material = state
        .store
        .get_material(material_id)
        .ok_or_else(AppError::not_found)?;
    Ok(Json(material))
}
