use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::Router;
use serde::Serialize;
use tower::util::ServiceExt;

use fieldbook::config::AppConfig;
use fieldbook::models::{PhotoAnalysis, StorePart, User};
use fieldbook::providers::ai::{AiProvider, DisabledAi};
use fieldbook::providers::catalog::{MockCatalog, PartCatalog};
use fieldbook::routes;
use fieldbook::search::matches_query;
use fieldbook::state::AppState;
use fieldbook::store::EntityStore;

/// AI provider returning fixed results, standing in for a healthy external
/// model.
#[allow(dead_code)]
pub struct ScriptedAi {
    pub analysis: PhotoAnalysis,
    pub enhancement: String,
    pub query: String,
}

impl Default for ScriptedAi {
    fn default() -> Self {
        Self {
            analysis: PhotoAnalysis {
                identified: "Toilet fill valve".to_string(),
                condition: "Corroded, intermittent shutoff".to_string(),
                recommendations: "Replace the fill valve".to_string(),
                parts: vec!["Fill valve".to_string(), "Supply line".to_string()],
                repair_steps: vec![
                    "Shut off water supply".to_string(),
                    "Swap valve and reseat".to_string(),
                ],
                estimated_repair_time: "45 minutes".to_string(),
                skill_level: "beginner".to_string(),
            },
            enhancement: "Replaced the fill valve and verified shutoff.".to_string(),
            query: "fill valve".to_string(),
        }
    }
}

#[async_trait]
impl AiProvider for ScriptedAi {
    async fn analyze_photo(
        &self,
        _data_url: &str,
        _caption: Option<&str>,
    ) -> Result<PhotoAnalysis> {
        Ok(self.analysis.clone())
    }

    async fn enhance_note(&self, _content: &str) -> Result<String> {
        Ok(self.enhancement.clone())
    }

    async fn identify_query(&self, _data_url: &str) -> Result<String> {
        Ok(self.query.clone())
    }
}

/// Catalog serving a fixed set of records filtered by the usual substring
/// match, for precise control over prices and stock in tests.
#[allow(dead_code)]
pub struct StaticCatalog {
    pub parts: Vec<StorePart>,
}

#[async_trait]
impl PartCatalog for StaticCatalog {
    async fn search(&self, query: &str) -> Result<Vec<StorePart>> {
        Ok(self
            .parts
            .iter()
            .filter(|part| matches_query(query, &[&part.name, &part.description]))
            .cloned()
            .collect())
    }
}

/// Catalog that always fails, for exercising the fallback path.
#[allow(dead_code)]
pub struct BrokenCatalog;

#[async_trait]
impl PartCatalog for BrokenCatalog {
    async fn search(&self, _query: &str) -> Result<Vec<StorePart>> {
        Err(anyhow!("catalog endpoint unreachable"))
    }
}

#[allow(dead_code)]
pub fn store_part(id: &str, store: &str, name: &str, price: i64, in_stock: bool) -> StorePart {
    StorePart {
        id: id.to_string(),
        store: store.to_string(),
        name: name.to_string(),
        price,
        in_stock,
        image: None,
        description: format!("{name} (test listing)"),
        address: "1 Test St".to_string(),
        distance: 1.0,
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        cors_allowed_origin: None,
        tax_rate_basis_points: 825,
        ai_endpoint: None,
        ai_model: "test-model".to_string(),
        ai_api_key: None,
        ai_timeout_seconds: 5,
        catalog_endpoint: None,
    }
}

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    /// Empty store, no AI configured, deterministic built-in catalog.
    pub fn new() -> Self {
        Self::with_providers(Arc::new(DisabledAi), Arc::new(MockCatalog::deterministic()))
    }

    #[allow(dead_code)]
    pub fn with_providers(ai: Arc<dyn AiProvider>, catalog: Arc<dyn PartCatalog>) -> Self {
        let store = Arc::new(EntityStore::new());
        let state = AppState::new(store, test_config(), ai, catalog);
        let router = routes::create_router(state.clone());
        Self { state, router }
    }

    /// Users have no write endpoint (authentication is out of scope), so
    /// tests seed technicians directly.
    #[allow(dead_code)]
    pub fn insert_technician(&self, name: &str) -> User {
        self.state
            .store
            .insert_user(name, &name.to_lowercase().replace(' ', ""), "technician", None)
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<hyper::Response<Body>> {
        let body = serde_json::to_vec(payload)?;
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body))?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    /// POST with an empty body (action endpoints take no payload).
    #[allow(dead_code)]
    pub async fn post_empty(&self, path: &str) -> Result<hyper::Response<Body>> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .body(Body::empty())?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    #[allow(dead_code)]
    pub async fn patch_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<hyper::Response<Body>> {
        let body = serde_json::to_vec(payload)?;
        let request = Request::builder()
            .method(Method::PATCH)
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body))?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    pub async fn get(&self, path: &str) -> Result<hyper::Response<Body>> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    #[allow(dead_code)]
    pub async fn delete(&self, path: &str) -> Result<hyper::Response<Body>> {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri(path)
            .body(Body::empty())?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }
}

/// Creates a customer and a job through the API; returns (job_id,
/// technician_id).
#[allow(dead_code)]
pub async fn seed_job(app: &TestApp) -> Result<(i64, i64)> {
    use anyhow::ensure;

    let technician = app.insert_technician("Test Tech");

    let response = app
        .post_json("/api/customers", &serde_json::json!({ "name": "Acme" }))
        .await?;
    ensure!(
        response.status() == axum::http::StatusCode::CREATED,
        "customer create failed with status {}",
        response.status()
    );
    let customer: serde_json::Value = body_to_json(response.into_body()).await?;
    let customer_id = customer["id"].as_i64().expect("customer id");

    let response = app
        .post_json(
            "/api/jobs",
            &serde_json::json!({
                "workOrderNumber": "WO1",
                "customerId": customer_id,
                "technicianId": technician.id,
                "description": "test job"
            }),
        )
        .await?;
    ensure!(
        response.status() == axum::http::StatusCode::CREATED,
        "job create failed with status {}",
        response.status()
    );
    let job: serde_json::Value = body_to_json(response.into_body()).await?;
    Ok((job["id"].as_i64().expect("job id"), technician.id))
}

pub async fn body_to_vec(body: Body) -> Result<Vec<u8>> {
    use http_body_util::BodyExt;
    let collected = body
        .collect()
        .await
        .map_err(|err| anyhow!("failed to read response body: {err}"))?;
    Ok(collected.to_bytes().to_vec())
}

pub async fn body_to_json<T: serde::de::DeserializeOwned>(body: Body) -> Result<T> {
    let bytes = body_to_vec(body).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Minimal data URL for photo payloads.
#[allow(dead_code)]
pub const TEST_DATA_URL: &str = "data:image/jpeg;base64,aGVsbG8gd29ybGQ=";
