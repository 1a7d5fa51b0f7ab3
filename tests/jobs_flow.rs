mod common;

use std::sync::Arc;

use anyhow::Result;
use axum::http::StatusCode;
use common::{body_to_json, seed_job, ScriptedAi, TestApp, TEST_DATA_URL};
use fieldbook::providers::catalog::MockCatalog;
use serde_json::{json, Value};

#[tokio::test]
async fn health_check_responds() -> Result<()> {
    let app = TestApp::new();
    let response = app.get("/api/health").await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn job_status_lifecycle() -> Result<()> {
    let app = TestApp::new();
    let (job_id, _) = seed_job(&app).await?;

    let response = app.get(&format!("/api/jobs/{job_id}")).await?;
    let job: Value = body_to_json(response.into_body()).await?;
    assert_eq!(job["status"].as_str(), Some("scheduled"));
    assert_eq!(job["workOrderNumber"].as_str(), Some("WO1"));

    let response = app
        .patch_json(
            &format!("/api/jobs/{job_id}/status"),
            &json!({ "status": "in_progress" }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let job: Value = body_to_json(response.into_body()).await?;
    assert_eq!(job["status"].as_str(), Some("in_progress"));

    // unknown status values never reach the store
    let response = app
        .patch_json(
            &format!("/api/jobs/{job_id}/status"),
            &json!({ "status": "procrastinating" }),
        )
        .await?;
    assert!(response.status().is_client_error());
    let response = app.get(&format!("/api/jobs/{job_id}")).await?;
    let job: Value = body_to_json(response.into_body()).await?;
    assert_eq!(job["status"].as_str(), Some("in_progress"));
    Ok(())
}

#[tokio::test]
async fn job_creation_validates_references() -> Result<()> {
    let app = TestApp::new();
    let technician = app.insert_technician("Ref Tech");

    let response = app
        .post_json(
            "/api/jobs",
            &json!({
                "workOrderNumber": "WO-77",
                "customerId": 12345,
                "technicianId": technician.id
            }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get("/api/jobs/555").await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn identify_parts_uses_job_photo_and_fallback_query() -> Result<()> {
    let app = TestApp::new();
    let (job_id, _) = seed_job(&app).await?;

    // no photos and no body: nothing to identify from
    let response = app
        .post_empty(&format!("/api/jobs/{job_id}/identify-parts"))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post_json(
            "/api/photos",
            &json!({ "jobId": job_id, "dataUrl": TEST_DATA_URL }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    // AI is down, so identification falls back to the canned query
    let response = app
        .post_empty(&format!("/api/jobs/{job_id}/identify-parts"))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = body_to_json(response.into_body()).await?;
    assert_eq!(body["query"].as_str(), Some("replacement part"));
    Ok(())
}

#[tokio::test]
async fn identify_parts_feeds_derived_query_into_search() -> Result<()> {
    let app = TestApp::with_providers(
        Arc::new(ScriptedAi::default()),
        Arc::new(MockCatalog::deterministic()),
    );
    let (job_id, _) = seed_job(&app).await?;

    let response = app
        .post_json(
            &format!("/api/jobs/{job_id}/identify-parts"),
            &json!({ "imageData": TEST_DATA_URL }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = body_to_json(response.into_body()).await?;
    assert_eq!(body["query"].as_str(), Some("fill valve"));
    // deterministic catalog: every store front quotes the base price
    assert_eq!(body["bestPrice"]["price"].as_i64(), Some(1299));
    assert!(body["stores"].as_array().map(Vec::len).unwrap_or(0) >= 4);

    let response = app
        .post_json("/api/jobs/999/identify-parts", &json!({ "imageData": TEST_DATA_URL }))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn customers_are_immutable_after_creation() -> Result<()> {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/api/customers",
            &json!({ "name": "Lakeside Dental", "city": "Austin" }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let customer: Value = body_to_json(response.into_body()).await?;
    let customer_id = customer["id"].as_i64().expect("customer id");

    // no update or delete route exists for customers
    let response = app
        .patch_json(
            &format!("/api/customers/{customer_id}"),
            &json!({ "name": "Renamed" }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let response = app.delete(&format!("/api/customers/{customer_id}")).await?;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let response = app
        .post_json("/api/customers", &json!({ "name": "  " }))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn users_and_materials_are_read_only_catalogs() -> Result<()> {
    let app = TestApp::new();
    let technician = app.insert_technician("List Tech");

    let response = app.get("/api/users").await?;
    assert_eq!(response.status(), StatusCode::OK);
    let users: Vec<Value> = body_to_json(response.into_body()).await?;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["id"].as_i64(), Some(technician.id));

    let response = app.get("/api/materials").await?;
    assert_eq!(response.status(), StatusCode::OK);
    let materials: Vec<Value> = body_to_json(response.into_body()).await?;
    // empty test store seeds no materials
    assert!(materials.is_empty());

    let response = app.get("/api/materials/1").await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}
