//! HTTP request handlers

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::error;

use crate::ci::models::{BuildTask, TaskDetails};
use crate::containers::Container;
use crate::errors::{ErrorKind, HarborError};
use crate::models::deployment::Deployment;
use crate::models::environment::Environment;
use crate::models::project::Project;
use crate::models::template::JobTemplate;
use crate::server::state::ServerState;
use crate::utils::{version_info, VersionInfo};

pub type ApiError = (StatusCode, String);

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Status code for an error kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Remote => StatusCode::BAD_GATEWAY,
        ErrorKind::Template => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Invalid => StatusCode::BAD_REQUEST,
        ErrorKind::Persistence | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_error(context: &str, err: HarborError) -> ApiError {
    let status = status_for(err.kind());
    let message = format!("{}: {}", context, err);
    error!("{} ({})", message, status);
    (status, message)
}

/// Liveness probe
pub async fn healthz_handler() -> &'static str {
    "OK"
}

pub async fn version_handler() -> Json<VersionInfo> {
    Json(version_info())
}

pub async fn projects_handler(State(state): State<Arc<ServerState>>) -> Json<Vec<Project>> {
    Json(state.registry.projects())
}

pub async fn environments_handler(
    State(state): State<Arc<ServerState>>,
) -> Json<Vec<Environment>> {
    Json(state.registry.environments())
}

pub async fn environment_handler(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
) -> ApiResult<Environment> {
    state
        .registry
        .environment_by_name(&name)
        .map(Json)
        .map_err(|e| api_error("Error finding environment", e))
}

pub async fn deployments_handler(
    State(state): State<Arc<ServerState>>,
) -> Json<Vec<Deployment>> {
    Json(state.registry.deployments())
}

pub async fn templates_handler(State(state): State<Arc<ServerState>>) -> Json<Vec<JobTemplate>> {
    Json(state.registry.templates())
}

pub async fn template_handler(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
) -> ApiResult<JobTemplate> {
    state
        .registry
        .template_by_name(&name)
        .map(Json)
        .map_err(|e| api_error("Error finding template", e))
}

pub async fn containers_handler(
    State(state): State<Arc<ServerState>>,
) -> ApiResult<Vec<Container>> {
    state
        .containers
        .list_containers()
        .await
        .map(Json)
        .map_err(|e| api_error("Error retrieving docker containers", e))
}

pub async fn discovery_handler(
    State(state): State<Arc<ServerState>>,
    Path(environment): Path<String>,
) -> ApiResult<BTreeMap<String, String>> {
    state
        .registry
        .discover(&environment)
        .map(Json)
        .map_err(|e| api_error("Error with discovery", e))
}

pub async fn jobs_handler(State(state): State<Arc<ServerState>>) -> ApiResult<Vec<BuildTask>> {
    state
        .ci
        .list_jobs()
        .await
        .map(Json)
        .map_err(|e| api_error("Error querying ci server", e))
}

pub async fn job_handler(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
) -> ApiResult<TaskDetails> {
    state
        .ci
        .get_job_details(&name)
        .await
        .map(Json)
        .map_err(|e| api_error(&format!("Error fetching build task '{}'", name), e))
}

/// Create a build job from a project document and register the project
pub async fn create_job_handler(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
    body: Result<Json<Project>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(mut project) = body.map_err(|e| {
        let message = format!("Error decoding project json: {}", e.body_text());
        error!("{}", message);
        (StatusCode::BAD_REQUEST, message)
    })?;

    if project.short_name.is_empty() {
        project.short_name = name.clone();
    } else if project.short_name != name {
        return Err(api_error(
            "Error creating ci task",
            HarborError::ValidationError(format!(
                "short name '{}' does not match job '{}'",
                project.short_name, name
            )),
        ));
    }

    let project = state
        .ci
        .create_job(project)
        .await
        .map_err(|e| api_error("Error creating ci task", e))?;

    Ok((StatusCode::CREATED, Json(project)))
}
