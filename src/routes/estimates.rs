use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::estimates;
use crate::models::{Estimate, EstimateItem, EstimateStatus};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitEstimateRequest {
    pub job_id: i64,
    pub status: Option<EstimateStatus>,
    pub notes: Option<String>,
    pub lock_amount: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: EstimateStatus,
}

/// Estimate with its items and the money breakdown the client renders.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateSummary {
    pub estimate: Estimate,
    pub items: Vec<EstimateItem>,
    pub subtotal: i64,
    pub tax: i64,
    pub total: i64,
}

/// Creates the job's estimate on first submission, updates status (and,
/// unless locked, the total) afterwards.
pub async fn submit_estimate(
    State(state): State<AppState>,
    Json(payload): Json<SubmitEstimateRequest>,
) -> AppResult<Json<Estimate>> {
    let estimate = state.store.submit_estimate(
        payload.job_id,
        payload.status.unwrap_or(EstimateStatus::Submitted),
        payload.notes,
        payload.lock_amount,
    )?;
    Ok(Json(estimate))
}

pub async fn get_job_estimate(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> AppResult<Json<EstimateSummary>> {
    if state.store.get_job(job_id).is_none() {
        return Err(AppError::not_found());
    }
    let estimate = state
        .store
        .estimate_for_job(job_id)
        .ok_or_else(AppError::not_found)?;
    let items = state.store.items_for_job(job_id);
    let subtotal = estimates::subtotal(&items);
    let rate = state.config.tax_rate_basis_points;
    Ok(Json(EstimateSummary {
        estimate,
        items,
        subtotal,
        tax: estimates::tax(subtotal, rate),
        total: estimates::total(subtotal, rate),
    }))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(estimate_id): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<Estimate>> {
    let estimate = state
        .store
        .set_estimate_status(estimate_id, payload.status)
        .ok_or_else(AppError::not_found)?;
    Ok(Json(estimate))
}
