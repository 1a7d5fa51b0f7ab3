use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::{Customer, NewCustomer};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

pub async fn list_customers(State(state): State<AppState>) -> Json<Vec<Customer>> {
    Json(state.store.list_customers())
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<i64>,
) -> AppResult<Json<Customer>> {
    let customer = state
        .store
        .get_customer(customer_id)
        .ok_or_else(AppError::not_found)?;
    Ok(Json(customer))
}

pub async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomerRequest>,
) -> AppResult<(StatusCode, Json<Customer>)> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }

    let customer = state.store.create_customer(NewCustomer {
        name: name.to_string(),
        email: payload.email,
        phone: payload.phone,
        address: payload.address,
        city: payload.city,
        state: payload.state,
        zip: payload.zip,
    });
    Ok((StatusCode::CREATED, Json(customer)))
}
