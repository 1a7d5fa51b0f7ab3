use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::{Job, JobStatus, NewJob};
use crate::providers::ai::FALLBACK_PART_QUERY;
use crate::routes::stores::run_search;
use crate::search::SearchResponse;
use crate::state::AppState;
use crate::utils::data_url::validate_data_url;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub work_order_number: String,
    pub customer_id: i64,
    pub technician_id: i64,
    pub status: Option<JobStatus>,
    pub description: Option<String>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub time_zone: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: JobStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyPartsRequest {
    pub image_data: Option<String>,
}

pub async fn list_jobs(State(state): State<AppState>) -> Json<Vec<Job>> {
    Json(state.store.list_jobs())
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> AppResult<Json<Job>> {
    let job = state.store.get_job(job_id).ok_or_else(AppError::not_found)?;
    Ok(Json(job))
}

pub async fn create_job(
    State(state): State<AppState>,
    Json(payload): Json<CreateJobRequest>,
) -> AppResult<(StatusCode, Json<Job>)> {
    let work_order_number = payload.work_order_number.trim();
    if work_order_number.is_empty() {
        return Err(AppError::bad_request("workOrderNumber must not be empty"));
    }
    if state.store.get_customer(payload.customer_id).is_none() {
        return Err(AppError::bad_request("customer does not exist"));
    }
    if state.store.get_user(payload.technician_id).is_none() {
        return Err(AppError::bad_request("technician does not exist"));
    }

    let job = state.store.create_job(NewJob {
        work_order_number: work_order_number.to_string(),
        customer_id: payload.customer_id,
        technician_id: payload.technician_id,
        status: payload.status.unwrap_or(JobStatus::Scheduled),
        description: payload.description.unwrap_or_default(),
        scheduled_for: payload.scheduled_for,
        time_zone: payload.time_zone,
    });
    Ok((StatusCode::CREATED, Json(job)))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<Job>> {
    let job = state
        .store
        .set_job_status(job_id, payload.status)
        .ok_or_else(AppError::not_found)?;
    Ok(Json(job))
}

/// Two-stage image search scoped to a job: the vision model turns a photo
/// into a free-text query, then the regular part search runs with it. With
/// no image in the body, the job's most recent photo is used.
pub async fn identify_parts(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
    payload: Option<Json<IdentifyPartsRequest>>,
) -> AppResult<Json<SearchResponse>> {
    if state.store.get_job(job_id).is_none() {
        return Err(AppError::not_found());
    }

    let image = match payload.and_then(|Json(body)| body.image_data) {
        Some(image) => {
            validate_data_url(&image).map_err(AppError::bad_request)?;
            image
        }
        None => state
            .store
            .latest_photo_for_job(job_id)
            .map(|photo| photo.data_url)
            .ok_or_else(|| {
                AppError::bad_request("job has no photos and no imageData was provided")
            })?,
    };

    let query = match state.ai.identify_query(&image).await {
        Ok(query) => query,
        Err(err) => {
            tracing::warn!(job_id, error = %err, "part identification unavailable, using fallback query");
            FALLBACK_PART_QUERY.to_string()
        }
    };

    Ok(Json(run_search(&state, &query).await))
}
