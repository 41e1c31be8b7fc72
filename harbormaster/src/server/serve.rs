//! HTTP server setup

use std::future::Future;
use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app::options::ServerOptions;
use crate::errors::HarborError;
use crate::server::handlers::{
    containers_handler, create_job_handler, deployments_handler, discovery_handler,
    environment_handler, environments_handler, healthz_handler, job_handler, jobs_handler,
    projects_handler, template_handler, templates_handler, version_handler,
};
use crate::server::state::ServerState;

/// Build the API router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        // Health and version
        .route("/healthz", get(healthz_handler))
        .route("/version", get(version_handler))
        // Registry
        .route("/v1/projects", get(projects_handler))
        .route("/v1/environments", get(environments_handler))
        .route("/v1/environments/{name}", get(environment_handler))
        .route("/v1/deployments", get(deployments_handler))
        .route("/v1/templates", get(templates_handler))
        .route("/v1/templates/{name}", get(template_handler))
        .route("/v1/discover/{environment}", get(discovery_handler))
        // Containers
        .route("/v1/containers", get(containers_handler))
        // Build jobs
        .route("/v1/jobs", get(jobs_handler))
        .route(
            "/v1/job/{name}",
            get(job_handler)
                .post(create_job_handler)
                .put(create_job_handler),
        )
        // State and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server
pub async fn serve(
    options: &ServerOptions,
    state: Arc<ServerState>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<JoinHandle<Result<(), HarborError>>, HarborError> {
    let app = router(state);

    let addr = format!("{}:{}", options.host, options.port);
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| HarborError::ServerError(e.to_string()))?;

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| HarborError::ServerError(e.to_string()))
    });

    Ok(handle)
}
