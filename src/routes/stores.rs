use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::providers::ai::FALLBACK_PART_QUERY;
use crate::providers::catalog::{MockCatalog, PartCatalog};
use crate::search::{self, SearchResponse};
use crate::state::AppState;
use crate::utils::data_url::validate_data_url;

#[derive(Deserialize)]
pub struct SearchParams {
    pub query: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSearchRequest {
    pub image_data: String,
}

/// Runs the configured catalog and falls back to the deterministic
/// built-in catalog when it fails; a search request never errors out
/// because the data source is down.
pub(crate) async fn run_search(state: &AppState, query: &str) -> SearchResponse {
    let parts = match state.catalog.search(query).await {
        Ok(parts) => parts,
        Err(err) => {
            tracing::warn!(query, error = %err, "part catalog unavailable, using built-in catalog");
            MockCatalog::deterministic()
                .search(query)
                .await
                .unwrap_or_default()
        }
    };
    search::build_response(query, parts)
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<SearchResponse>> {
    let query = params.query.trim();
    if query.is_empty() {
        return Err(AppError::bad_request("query must not be empty"));
    }
    Ok(Json(run_search(&state, query).await))
}

/// Two-stage image search: the vision model derives an opaque query string
/// from the image, then the text search runs with it unchanged.
pub async fn search_by_image(
    State(state): State<AppState>,
    Json(payload): Json<ImageSearchRequest>,
) -> AppResult<Json<SearchResponse>> {
    validate_data_url(&payload.image_data).map_err(AppError::bad_request)?;

    let query = match state.ai.identify_query(&payload.image_data).await {
        Ok(query) => query,
        Err(err) => {
            tracing::warn!(error = %err, "part identification unavailable, using fallback query");
            FALLBACK_PART_QUERY.to_string()
        }
    };

    Ok(Json(run_search(&state, &query).await))
}
