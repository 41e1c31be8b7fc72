//! Persistence backends for the registry

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::errors::HarborError;
use crate::models::deployment::DeploymentJoin;
use crate::models::environment::Environment;
use crate::models::project::Project;
use crate::models::template::JobTemplate;
use crate::storage::layout::StorageLayout;

/// Where registry collections are read from and written to
#[async_trait]
pub trait RegistryStorage: Send + Sync {
    async fn load_projects(&self) -> Result<Vec<Project>, HarborError>;

    async fn load_environments(&self) -> Result<Vec<Environment>, HarborError>;

    async fn load_templates(&self) -> Result<Vec<JobTemplate>, HarborError>;

    async fn load_deployment_joins(&self) -> Result<Vec<DeploymentJoin>, HarborError>;

    /// Replace the persisted project set
    async fn save_projects(&self, projects: &[Project]) -> Result<(), HarborError>;
}

/// JSON files in the data directory
pub struct FileStorage {
    layout: StorageLayout,
}

impl FileStorage {
    pub fn new(layout: StorageLayout) -> Self {
        Self { layout }
    }

    /// Templates kept as individual files under `templates/`
    async fn load_template_dir(&self) -> Result<Vec<JobTemplate>, HarborError> {
        let dir = self.layout.templates_dir();
        if !dir.exists().await {
            debug!("No template directory at {}", dir.path().display());
            return Ok(Vec::new());
        }

        let mut templates = Vec::new();
        for file in dir.list_files().await? {
            let Some(name) = file.stem() else {
                continue;
            };
            match file.read_string().await {
                Ok(content) => templates.push(JobTemplate {
                    name,
                    description: String::new(),
                    content,
                }),
                Err(e) => warn!("Skipping template {}: {}", file.path().display(), e),
            }
        }
        Ok(templates)
    }
}

#[async_trait]
impl RegistryStorage for FileStorage {
    async fn load_projects(&self) -> Result<Vec<Project>, HarborError> {
        self.layout.projects_file().read_json().await
    }

    async fn load_environments(&self) -> Result<Vec<Environment>, HarborError> {
        self.layout.environments_file().read_json().await
    }

    async fn load_templates(&self) -> Result<Vec<JobTemplate>, HarborError> {
        let templates_file = self.layout.templates_file();
        let mut templates: Vec<JobTemplate> = if templates_file.exists().await {
            templates_file.read_json().await?
        } else {
            Vec::new()
        };

        for template in self.load_template_dir().await? {
            if templates.iter().any(|t| t.name == template.name) {
                warn!(
                    "Template '{}' is defined in templates.json and the template directory, keeping the former",
                    template.name
                );
                continue;
            }
            templates.push(template);
        }
        Ok(templates)
    }

    async fn load_deployment_joins(&self) -> Result<Vec<DeploymentJoin>, HarborError> {
        self.layout.deployments_file().read_json().await
    }

    async fn save_projects(&self, projects: &[Project]) -> Result<(), HarborError> {
        self.layout.projects_file().write_json(&projects).await
    }
}

/// In-memory storage for fixtures and tests
#[derive(Default)]
pub struct MemoryStorage {
    projects: Mutex<Vec<Project>>,
    environments: Vec<Environment>,
    templates: Vec<JobTemplate>,
    joins: Vec<DeploymentJoin>,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new(
        projects: Vec<Project>,
        environments: Vec<Environment>,
        templates: Vec<JobTemplate>,
        joins: Vec<DeploymentJoin>,
    ) -> Self {
        Self {
            projects: Mutex::new(projects),
            environments,
            templates,
            joins,
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent save fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Projects as last saved
    pub fn saved_projects(&self) -> Vec<Project> {
        self.projects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl RegistryStorage for MemoryStorage {
    async fn load_projects(&self) -> Result<Vec<Project>, HarborError> {
        Ok(self.saved_projects())
    }

    async fn load_environments(&self) -> Result<Vec<Environment>, HarborError> {
        Ok(self.environments.clone())
    }

    async fn load_templates(&self) -> Result<Vec<JobTemplate>, HarborError> {
        Ok(self.templates.clone())
    }

    async fn load_deployment_joins(&self) -> Result<Vec<DeploymentJoin>, HarborError> {
        Ok(self.joins.clone())
    }

    async fn save_projects(&self, projects: &[Project]) -> Result<(), HarborError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(HarborError::IoError(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "writes disabled",
            )));
        }
        let mut stored = self.projects.lock().unwrap_or_else(|e| e.into_inner());
        *stored = projects.to_vec();
        Ok(())
    }
}
