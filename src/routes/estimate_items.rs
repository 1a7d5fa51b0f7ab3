use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::{EstimateItem, ItemKind, NewEstimateItem};
use crate::state::AppState;
use crate::store::EstimateItemPatch;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFilter {
    pub job_id: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub job_id: i64,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub description: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub store_source: Option<String>,
    pub material_id: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price: Option<i64>,
    #[serde(default, with = "double_option")]
    pub store_source: Option<Option<String>>,
}

/// Distinguishes an omitted `storeSource` from an explicit null: omitted
/// leaves the field alone, null clears it.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer).map(Some)
    }
}

pub async fn list_items(
    State(state): State<AppState>,
    Query(filter): Query<ItemFilter>,
) -> Json<Vec<EstimateItem>> {
    let items = match filter.job_id {
        Some(job_id) => state.store.items_for_job(job_id),
        None => state.store.list_estimate_items(),
    };
    Json(items)
}

pub async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<CreateItemRequest>,
) -> AppResult<(StatusCode, Json<EstimateItem>)> {
    if payload.description.trim().is_empty() {
        return Err(AppError::bad_request("description must not be empty"));
    }
    if payload.quantity < 0 {
        return Err(AppError::bad_request("quantity must not be negative"));
    }
    if payload.unit_price < 0 {
        return Err(AppError::bad_request("unitPrice must not be negative"));
    }
    if state.store.get_job(payload.job_id).is_none() {
        return Err(AppError::bad_request("job does not exist"));
    }
    if let Some(material_id) = payload.material_id {
        if state.store.get_material(material_id).is_none() {
            return Err(AppError::bad_request("material does not exist"));
        }
    }

    let item = state.store.create_estimate_item(NewEstimateItem {
        job_id: payload.job_id,
        kind: payload.kind,
        description: payload.description,
        quantity: payload.quantity,
        unit_price: payload.unit_price,
        store_source: payload.store_source,
        material_id: payload.material_id,
    });
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
    Json(payload): Json<UpdateItemRequest>,
) -> AppResult<Json<EstimateItem>> {
    if let Some(quantity) = payload.quantity {
        if quantity < 0 {
            return Err(AppError::bad_request("quantity must not be negative"));
        }
    }
    if let Some(unit_price) = payload.unit_price {
        if unit_price < 0 {
            return Err(AppError::bad_request("unitPrice must not be negative"));
        }
    }
    if let Some(ref description) = payload.description {
        if description.trim().is_empty() {
            return Err(AppError::bad_request("description must not be empty"));
        }
    }

    let item = state
        .store
        .update_estimate_item(
            item_id,
            EstimateItemPatch {
                description: payload.description,
                quantity: payload.quantity,
                unit_price: payload.unit_price,
                store_source: payload.store_source,
            },
        )
        .ok_or_else(AppError::not_found)?;
    Ok(Json(item))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    state
        .store
        .delete_estimate_item(item_id)
        .ok_or_else(AppError::not_found)?;
    Ok(StatusCode::NO_CONTENT)
}
