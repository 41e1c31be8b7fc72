//! Build server proxy.
//!
//! Callers talk to a [`CiProxy`], which forwards to whichever variant is
//! current: a [`DisconnectedProxy`] that refuses every call with
//! `Unavailable`, or a [`LiveProxy`] bound to a server connection. The
//! reconnect worker moves a disconnected proxy to live by calling
//! [`CiProxy::install`]. Nothing moves it back.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::ci::models::{Build, BuildTask, TaskDetails};
use crate::ci::server::{BuildServer, BuildServerConnector};
use crate::errors::HarborError;
use crate::models::project::Project;
use crate::registry::Registry;
use crate::templates;

/// Build job operations exposed to the rest of the service
#[async_trait]
pub trait BuildServerProxy: Send + Sync {
    /// Every job with its health
    async fn list_jobs(&self) -> Result<Vec<BuildTask>, HarborError>;

    /// One job with its last build and downstream jobs
    async fn get_job_details(&self, name: &str) -> Result<TaskDetails, HarborError>;

    /// Render the project's template, create the job remotely and register
    /// the project. Returns the project as stored.
    async fn create_job(&self, project: Project) -> Result<Project, HarborError>;

    fn is_connected(&self) -> bool;
}

/// Fold any build server failure into `RemoteError`
fn remote(err: HarborError) -> HarborError {
    match err {
        HarborError::RemoteError(_) => err,
        other => HarborError::RemoteError(other.to_string()),
    }
}

/// Like [`remote`], but a missing job stays `NotFound`
fn remote_lookup(err: HarborError) -> HarborError {
    match err {
        HarborError::NotFound(_) => err,
        other => remote(other),
    }
}

/// Forwards to a live build server connection
pub struct LiveProxy {
    server: Arc<dyn BuildServer>,
    registry: Arc<Registry>,
}

impl LiveProxy {
    pub fn new(server: Arc<dyn BuildServer>, registry: Arc<Registry>) -> Self {
        Self { server, registry }
    }
}

#[async_trait]
impl BuildServerProxy for LiveProxy {
    async fn list_jobs(&self) -> Result<Vec<BuildTask>, HarborError> {
        let jobs = self.server.list_all_jobs().await.map_err(remote)?;
        Ok(jobs.iter().map(BuildTask::from).collect())
    }

    async fn get_job_details(&self, name: &str) -> Result<TaskDetails, HarborError> {
        let job = self.server.get_job(name).await.map_err(remote_lookup)?;
        let downstream = job.downstream.iter().map(BuildTask::from).collect();

        let last_build = match self.server.last_build(&job).await {
            Ok(build) => Build::from(build),
            Err(e) => {
                warn!("Could not fetch last build of '{}': {}", name, e);
                Build::default()
            }
        };

        Ok(TaskDetails {
            name: job.name,
            url: job.url,
            description: job.description,
            last_build,
            downstream,
        })
    }

    async fn create_job(&self, project: Project) -> Result<Project, HarborError> {
        if project.short_name.trim().is_empty() {
            return Err(HarborError::ValidationError(
                "project short name is required".to_string(),
            ));
        }

        let definition = templates::render(&project.build_template, &project)?;
        let job = project.short_name.clone();

        self.server
            .create_job(&definition, &job)
            .await
            .map_err(remote)?;
        info!("Created build job '{}'", job);

        self.registry.add_project(project).await.map_err(|e| {
            error!("Build job '{}' exists but its project was not saved: {}", job, e);
            HarborError::JobNotRegistered {
                job: job.clone(),
                reason: e.to_string(),
            }
        })
    }

    fn is_connected(&self) -> bool {
        true
    }
}

/// Stand-in used while there is no connection
#[derive(Debug, Default)]
pub struct DisconnectedProxy;

impl DisconnectedProxy {
    fn unavailable() -> HarborError {
        HarborError::Unavailable("no connection to build server".to_string())
    }
}

#[async_trait]
impl BuildServerProxy for DisconnectedProxy {
    async fn list_jobs(&self) -> Result<Vec<BuildTask>, HarborError> {
        Err(Self::unavailable())
    }

    async fn get_job_details(&self, _name: &str) -> Result<TaskDetails, HarborError> {
        Err(Self::unavailable())
    }

    async fn create_job(&self, _project: Project) -> Result<Project, HarborError> {
        Err(Self::unavailable())
    }

    fn is_connected(&self) -> bool {
        false
    }
}

/// Swappable handle over the current proxy variant
pub struct CiProxy {
    current: RwLock<Arc<dyn BuildServerProxy>>,
    registry: Arc<Registry>,
}

impl CiProxy {
    pub fn disconnected(registry: Arc<Registry>) -> Self {
        Self {
            current: RwLock::new(Arc::new(DisconnectedProxy)),
            registry,
        }
    }

    pub fn live(server: Arc<dyn BuildServer>, registry: Arc<Registry>) -> Self {
        Self {
            current: RwLock::new(Arc::new(LiveProxy::new(server, registry.clone()))),
            registry,
        }
    }

    /// Try to connect once; fall back to a disconnected proxy
    pub async fn connect(connector: &dyn BuildServerConnector, registry: Arc<Registry>) -> Self {
        match connector.connect().await {
            Ok(server) => {
                info!("Connected to build server");
                Self::live(server, registry)
            }
            Err(e) => {
                error!("Could not connect to build server: {}", e);
                error!("Please check your connection and configuration settings");
                Self::disconnected(registry)
            }
        }
    }

    /// Replace the current variant with a live one
    pub async fn install(&self, server: Arc<dyn BuildServer>) {
        let live: Arc<dyn BuildServerProxy> =
            Arc::new(LiveProxy::new(server, self.registry.clone()));
        *self.current.write().await = live;
    }

    async fn current(&self) -> Arc<dyn BuildServerProxy> {
        self.current.read().await.clone()
    }

    pub async fn connected(&self) -> bool {
        self.current().await.is_connected()
    }
}

#[async_trait]
impl BuildServerProxy for CiProxy {
    async fn list_jobs(&self) -> Result<Vec<BuildTask>, HarborError> {
        self.current().await.list_jobs().await
    }

    async fn get_job_details(&self, name: &str) -> Result<TaskDetails, HarborError> {
        self.current().await.get_job_details(name).await
    }

    async fn create_job(&self, project: Project) -> Result<Project, HarborError> {
        self.current().await.create_job(project).await
    }

    fn is_connected(&self) -> bool {
        self.current
            .try_read()
            .map(|proxy| proxy.is_connected())
            .unwrap_or(false)
    }
}
