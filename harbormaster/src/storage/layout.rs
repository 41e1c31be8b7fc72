//! Storage layout configuration

use std::path::PathBuf;

use tracing::info;

use crate::errors::HarborError;
use crate::filesys::dir::Dir;
use crate::filesys::file::File;
use crate::storage::config::ServiceConfig;

/// Data directory holding the persisted registry
#[derive(Debug, Clone)]
pub struct StorageLayout {
    /// Base directory for all storage
    pub base_dir: PathBuf,
}

impl StorageLayout {
    /// Create a new storage layout
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base(&self) -> Dir {
        Dir::new(&self.base_dir)
    }

    pub fn config_file(&self) -> File {
        File::new(self.base_dir.join("config.json"))
    }

    pub fn projects_file(&self) -> File {
        File::new(self.base_dir.join("projects.json"))
    }

    pub fn environments_file(&self) -> File {
        File::new(self.base_dir.join("environments.json"))
    }

    pub fn deployments_file(&self) -> File {
        File::new(self.base_dir.join("deployments.json"))
    }

    pub fn templates_file(&self) -> File {
        File::new(self.base_dir.join("templates.json"))
    }

    /// Directory of preloaded template bodies, one file per template
    pub fn templates_dir(&self) -> Dir {
        Dir::new(self.base_dir.join("templates"))
    }

    /// Create and seed the data directory on first run.
    ///
    /// Returns `true` if the directory was created.
    pub async fn setup(&self) -> Result<bool, HarborError> {
        if self.base().exists().await {
            return Ok(false);
        }

        info!("Creating new data directory at {}", self.base_dir.display());
        self.base().create().await?;

        let empty: Vec<serde_json::Value> = Vec::new();
        self.config_file().write_json(&ServiceConfig::default()).await?;
        self.projects_file().write_json(&empty).await?;
        self.environments_file().write_json(&empty).await?;
        self.deployments_file().write_json(&empty).await?;
        self.templates_file().write_json(&empty).await?;

        Ok(true)
    }
}

impl Default for StorageLayout {
    fn default() -> Self {
        Self::new(".harbormaster")
    }
}
