use axum::http::HeaderValue;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod customers;
pub mod estimate_items;
pub mod estimates;
pub mod health;
pub mod jobs;
pub mod materials;
pub mod notes;
pub mod photos;
pub mod stores;
pub mod users;

pub fn create_router(state: AppState) -> Router<()> {
    let cors = if let Some(origins) = state.config.cors_allowed_origin.as_ref() {
        let headers: Vec<HeaderValue> = origins
            .split(',')
            .filter_map(|value| {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| {
                    trimmed
                        .parse::<HeaderValue>()
                        .expect("invalid CORS allowed origin")
                })
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(headers))
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    };

    let users_routes = Router::new()
        .route("/", get(users::list_users))
        .route("/:id", get(users::get_user));

    let customers_routes = Router::new()
        .route(
            "/",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route("/:id", get(customers::get_customer));

    let jobs_routes = Router::new()
        .route("/", get(jobs::list_jobs).post(jobs::create_job))
        .route("/:id", get(jobs::get_job))
        .route("/:id/status", patch(jobs::update_status))
        .route("/:id/identify-parts", post(jobs::identify_parts));

    let photos_routes = Router::new()
        .route("/", get(photos::list_photos).post(photos::create_photo))
        .route("/:id", get(photos::get_photo))
        .route("/:id/analyze", post(photos::analyze_photo));

    let notes_routes = Router::new()
        .route("/", get(notes::list_notes).post(notes::create_note))
        .route("/:id/enhance", post(notes::enhance_note));

    let materials_routes = Router::new()
        .route("/", get(materials::list_materials))
        .route("/:id", get(materials::get_material));

    let estimate_items_routes = Router::new()
        .route(
            "/",
            get(estimate_items::list_items).post(estimate_items::create_item),
        )
        .route(
            "/:id",
            patch(estimate_items::update_item).delete(estimate_items::delete_item),
        );

    let estimates_routes = Router::new()
        .route("/", post(estimates::submit_estimate))
        .route("/job/:job_id", get(estimates::get_job_estimate))
        .route("/:id/status", patch(estimates::update_status));

    let stores_routes = Router::new()
        .route("/search", get(stores::search))
        .route("/search-by-image", post(stores::search_by_image));

    Router::new()
        .nest("/api/users", users_routes)
        .nest("/api/customers", customers_routes)
        .nest("/api/jobs", jobs_routes)
        .nest("/api/photos", photos_routes)
        .nest("/api/notes", notes_routes)
        .nest("/api/materials", materials_routes)
        .nest("/api/estimate-items", estimate_items_routes)
        .nest("/api/estimates", estimates_routes)
        .nest("/api/stores", stores_routes)
        .route("/api/health", get(health::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // photos arrive inline as base64 data URLs
        .layer(DefaultBodyLimit::max(1024 * 1024 * 32))
}
