//! In-memory registry with single-writer persistence

use std::future::Future;
use std::sync::{Arc, RwLock};

use tokio::sync::Mutex;
use tracing::{error, info};

use crate::errors::HarborError;
use crate::models::deployment::{Deployment, DeploymentJoin};
use crate::models::environment::Environment;
use crate::models::project::{sort_by_short_name, Project};
use crate::models::template::JobTemplate;
use crate::registry::reconcile::reconcile;
use crate::registry::storage::RegistryStorage;

/// One consistent view of every collection
#[derive(Debug, Default)]
pub(crate) struct RegistryState {
    pub(crate) projects: Vec<Project>,
    pub(crate) environments: Vec<Environment>,
    pub(crate) templates: Vec<JobTemplate>,
    pub(crate) joins: Vec<DeploymentJoin>,
    pub(crate) deployments: Vec<Deployment>,
}

impl RegistryState {
    pub(crate) fn environment_by_name(&self, name: &str) -> Result<&Environment, HarborError> {
        self.environments
            .iter()
            .find(|e| e.is_named(name))
            .ok_or_else(|| HarborError::NotFound(format!("environment named '{}'", name)))
    }
}

/// The registry store.
///
/// Readers clone an `Arc` of the current state; writers build a new state and
/// swap it in, so a reader never sees a half-applied update.
pub struct Registry {
    storage: Arc<dyn RegistryStorage>,
    state: RwLock<Arc<RegistryState>>,
    write_lock: Mutex<()>,
}

impl Registry {
    /// Create an empty registry backed by `storage`
    pub fn new(storage: Arc<dyn RegistryStorage>) -> Self {
        Self {
            storage,
            state: RwLock::new(Arc::new(RegistryState::default())),
            write_lock: Mutex::new(()),
        }
    }

    /// Create a registry and load it
    pub async fn open(storage: Arc<dyn RegistryStorage>) -> Self {
        let registry = Self::new(storage);
        registry.load().await;
        registry
    }

    /// (Re)load every collection and rebuild deployments from scratch.
    ///
    /// A collection that cannot be read is logged and left empty.
    pub async fn load(&self) {
        let _guard = self.write_lock.lock().await;
        info!("Loading registry...");

        let projects = load_or_empty("projects", self.storage.load_projects()).await;
        let environments = load_or_empty("environments", self.storage.load_environments()).await;
        let templates = load_or_empty("templates", self.storage.load_templates()).await;
        let joins = load_or_empty("deployments", self.storage.load_deployment_joins()).await;

        let deployments = reconcile(&joins, &projects, &environments);
        info!(
            "Registry loaded: {} projects, {} environments, {} templates, {}/{} deployments resolved",
            projects.len(),
            environments.len(),
            templates.len(),
            deployments.len(),
            joins.len()
        );

        self.swap(RegistryState {
            projects,
            environments,
            templates,
            joins,
            deployments,
        });
    }

    pub(crate) fn snapshot(&self) -> Arc<RegistryState> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn swap(&self, state: RegistryState) {
        let mut current = self.state.write().unwrap_or_else(|e| e.into_inner());
        *current = Arc::new(state);
    }

    pub fn projects(&self) -> Vec<Project> {
        self.snapshot().projects.clone()
    }

    pub fn environments(&self) -> Vec<Environment> {
        self.snapshot().environments.clone()
    }

    pub fn templates(&self) -> Vec<JobTemplate> {
        self.snapshot().templates.clone()
    }

    pub fn deployments(&self) -> Vec<Deployment> {
        self.snapshot().deployments.clone()
    }

    /// Case-insensitive lookup by name
    pub fn environment_by_name(&self, name: &str) -> Result<Environment, HarborError> {
        self.snapshot().environment_by_name(name).cloned()
    }

    pub fn environment_by_id(&self, id: u64) -> Result<Environment, HarborError> {
        self.snapshot()
            .environments
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| HarborError::NotFound(format!("environment with id {}", id)))
    }

    pub fn template_by_name(&self, name: &str) -> Result<JobTemplate, HarborError> {
        self.snapshot()
            .templates
            .iter()
            .find(|t| t.name == name)
            .cloned()
            .ok_or_else(|| HarborError::NotFound(format!("template '{}'", name)))
    }

    /// Append a project, keep the set sorted by short name and persist it.
    ///
    /// A project without an id gets the next free one. The in-memory append
    /// stands even if the write fails.
    pub async fn add_project(&self, mut project: Project) -> Result<Project, HarborError> {
        let _guard = self.write_lock.lock().await;
        let current = self.snapshot();

        if project.id == 0 {
            project.id = current.projects.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        }

        let mut projects = current.projects.clone();
        projects.push(project.clone());
        sort_by_short_name(&mut projects);

        self.swap(RegistryState {
            projects: projects.clone(),
            environments: current.environments.clone(),
            templates: current.templates.clone(),
            joins: current.joins.clone(),
            deployments: current.deployments.clone(),
        });
        info!("Registered project '{}' with id {}", project.short_name, project.id);

        self.storage.save_projects(&projects).await.map_err(|e| {
            error!("Failed to save projects: {}", e);
            HarborError::PersistenceError(format!("failed to save projects: {}", e))
        })?;

        Ok(project)
    }
}

async fn load_or_empty<T>(
    collection: &str,
    load: impl Future<Output = Result<Vec<T>, HarborError>>,
) -> Vec<T> {
    match load.await {
        Ok(items) => items,
        Err(e) => {
            error!("Error loading {}, starting with none: {}", collection, e);
            Vec::new()
        }
    }
}
