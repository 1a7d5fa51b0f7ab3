use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{Estimate, EstimateItem, NewPhoto, Photo};
use crate::providers::ai::fallback_analysis;
use crate::state::AppState;
use crate::utils::data_url::validate_data_url;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoFilter {
    pub job_id: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePhotoRequest {
    pub job_id: i64,
    pub caption: Option<String>,
    pub data_url: String,
    #[serde(default)]
    pub before_photo: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub photo: Photo,
    pub estimate: Estimate,
    pub created_item: Option<EstimateItem>,
}

pub async fn list_photos(
    State(state): State<AppState>,
    Query(filter): Query<PhotoFilter>,
) -> Json<Vec<Photo>> {
    let photos = match filter.job_id {
        Some(job_id) => state.store.photos_for_job(job_id),
        None => state.store.list_photos(),
    };
    Json(photos)
}

pub async fn get_photo(
    State(state): State<AppState>,
    Path(photo_id): Path<i64>,
) -> AppResult<Json<Photo>> {
    let photo = state
        .store
        .get_photo(photo_id)
        .ok_or_else(AppError::not_found)?;
    Ok(Json(photo))
}

pub async fn create_photo(
    State(state): State<AppState>,
    Json(payload): Json<CreatePhotoRequest>,
) -> AppResult<(StatusCode, Json<Photo>)> {
    if state.store.get_job(payload.job_id).is_none() {
        return Err(AppError::bad_request("job does not exist"));
    }
    validate_data_url(&payload.data_url).map_err(AppError::bad_request)?;

    let photo = state.store.create_photo(NewPhoto {
        job_id: payload.job_id,
        caption: payload.caption,
        data_url: payload.data_url,
        before_photo: payload.before_photo,
    });
    Ok((StatusCode::CREATED, Json(photo)))
}

/// Runs the vision analysis for a photo and applies it together with its
/// side effects (draft estimate, placeholder part item) in one store
/// transaction. A failed or misbehaving model yields the canned analysis
/// instead of an error.
pub async fn analyze_photo(
    State(state): State<AppState>,
    Path(photo_id): Path<i64>,
) -> AppResult<Json<AnalyzeResponse>> {
    let photo = state
        .store
        .get_photo(photo_id)
        .ok_or_else(AppError::not_found)?;

    let analysis = match state
        .ai
        .analyze_photo(&photo.data_url, photo.caption.as_deref())
        .await
    {
        Ok(analysis) => analysis,
        Err(err) => {
            tracing::warn!(photo_id, error = %err, "photo analysis unavailable, using fallback");
            fallback_analysis()
        }
    };

    let outcome = state.store.apply_photo_analysis(photo_id, analysis)?;
    Ok(Json(AnalyzeResponse {
        photo: outcome.photo,
        estimate: outcome.estimate,
        created_item: outcome.created_item,
    }))
}
