//! HTTP API tests

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::Router;
use http::{Method, Request, StatusCode};
use tower::ServiceExt;

use harbormaster::ci::proxy::{BuildServerProxy, CiProxy};
use harbormaster::containers::{Container, ContainerEngine};
use harbormaster::errors::HarborError;
use harbormaster::registry::Registry;
use harbormaster::server::serve::router;
use harbormaster::server::state::ServerState;

use common::{fixture_registry, job, FakeBuildServer};

struct NoContainers;

#[async_trait]
impl ContainerEngine for NoContainers {
    async fn list_containers(&self) -> Result<Vec<Container>, HarborError> {
        Err(HarborError::ContainerError("docker not running".to_string()))
    }
}

fn app(registry: Arc<Registry>, ci: Arc<dyn BuildServerProxy>) -> Router {
    router(Arc::new(ServerState::new(registry, ci, Arc::new(NoContainers))))
}

async fn send(app: Router, method: Method, uri: &str, body: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    send(app, Method::GET, uri, "").await
}

#[tokio::test]
async fn test_healthz() {
    let registry = fixture_registry().await;
    let app = app(registry.clone(), Arc::new(CiProxy::disconnected(registry)));

    let (status, body) = get(app, "/healthz").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_discover() {
    let registry = fixture_registry().await;
    let app = app(registry.clone(), Arc::new(CiProxy::disconnected(registry)));

    let (status, body) = get(app.clone(), "/v1/discover/PROD").await;
    assert_eq!(status, StatusCode::OK);
    let map: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        map,
        serde_json::json!({"billing": "prod.local:8001", "catalog": "prod.local:8002"})
    );

    let (status, _) = get(app, "/v1/discover/qa").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_registry_listings() {
    let registry = fixture_registry().await;
    let app = app(registry.clone(), Arc::new(CiProxy::disconnected(registry)));

    let (status, body) = get(app.clone(), "/v1/deployments").await;
    assert_eq!(status, StatusCode::OK);
    let deployments: Vec<serde_json::Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(deployments.len(), 3);
    assert_eq!(deployments[0]["project"]["shortName"], "billing");
    assert_eq!(deployments[0]["location"], "prod.local:8001");

    let (status, body) = get(app.clone(), "/v1/environments/dev").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("dev.local"));

    let (status, _) = get(app.clone(), "/v1/templates/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get(app, "/v1/projects").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("catalog"));
}

#[tokio::test]
async fn test_jobs_unavailable_while_disconnected() {
    let registry = fixture_registry().await;
    let app = app(registry.clone(), Arc::new(CiProxy::disconnected(registry)));

    let (status, _) = get(app, "/v1/jobs").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_container_errors_are_server_errors() {
    let registry = fixture_registry().await;
    let app = app(registry.clone(), Arc::new(CiProxy::disconnected(registry)));

    let (status, body) = get(app, "/v1/containers").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("docker not running"));
}

#[tokio::test]
async fn test_get_job() {
    let registry = fixture_registry().await;
    let server = Arc::new(FakeBuildServer::with_jobs(vec![job("billing", "blue")]));
    let app = app(registry.clone(), Arc::new(CiProxy::live(server, registry)));

    let (status, body) = get(app.clone(), "/v1/job/billing").await;
    assert_eq!(status, StatusCode::OK);
    let details: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(details["name"], "billing");
    assert_eq!(details["downstreamBuilds"], serde_json::json!([]));

    let (status, _) = get(app, "/v1/job/ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_build_server_404_is_bad_gateway() {
    let registry = fixture_registry().await;
    let server = Arc::new(FakeBuildServer::default());
    server.not_found.store(true, Ordering::SeqCst);
    let app = app(registry.clone(), Arc::new(CiProxy::live(server, registry)));

    let (status, _) = get(app.clone(), "/v1/jobs").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (status, _) = send(app, Method::POST, "/v1/job/accounts", r#"{"name": "Accounts"}"#).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_post_job_creates_and_registers() {
    let registry = fixture_registry().await;
    let server = Arc::new(FakeBuildServer::default());
    let app = app(registry.clone(), Arc::new(CiProxy::live(server.clone(), registry.clone())));
    let body = serde_json::json!({
        "name": "Accounts",
        "description": "ledger",
        "buildTemplate": {"name": "basic", "content": "<job>{{ shortName }}: {{ description }}</job>"}
    });

    let (status, response) = send(app, Method::POST, "/v1/job/accounts", &body.to_string()).await;

    assert_eq!(status, StatusCode::CREATED);
    let created: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert_eq!(created["shortName"], "accounts");
    assert_eq!(server.created()[0].1, "<job>accounts: ledger</job>");
    assert!(registry.projects().iter().any(|p| p.short_name == "accounts"));
}

#[tokio::test]
async fn test_put_job_rejects_mismatched_name() {
    let registry = fixture_registry().await;
    let server = Arc::new(FakeBuildServer::default());
    let app = app(registry.clone(), Arc::new(CiProxy::live(server.clone(), registry)));
    let body = serde_json::json!({"name": "Accounts", "shortName": "other"});

    let (status, _) = send(app, Method::PUT, "/v1/job/accounts", &body.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(server.created().is_empty());
}

#[tokio::test]
async fn test_post_job_bad_json() {
    let registry = fixture_registry().await;
    let app = app(registry.clone(), Arc::new(CiProxy::disconnected(registry)));

    let (status, body) = send(app, Method::POST, "/v1/job/accounts", "{ nope").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with("Error decoding project json"));
}

#[tokio::test]
async fn test_post_job_template_error() {
    let registry = fixture_registry().await;
    let server = Arc::new(FakeBuildServer::default());
    let app = app(registry.clone(), Arc::new(CiProxy::live(server, registry)));
    let body = serde_json::json!({
        "name": "Accounts",
        "buildTemplate": {"name": "basic", "content": "{% if %}"}
    });

    let (status, _) = send(app, Method::POST, "/v1/job/accounts", &body.to_string()).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
