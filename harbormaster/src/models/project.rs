//! Project model

use serde::{Deserialize, Serialize};

use crate::models::template::JobTemplate;

/// A deployable unit of software tracked by the registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Registry id, zero until persisted
    #[serde(default)]
    pub id: u64,

    #[serde(default)]
    pub name: String,

    /// Stable external key used for discovery and job naming
    #[serde(default)]
    pub short_name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub contact_name: String,

    /// Source repository URL
    #[serde(default)]
    pub github_url: String,

    /// Build template embedded by value when the project is created
    #[serde(default)]
    pub build_template: JobTemplate,
}

/// Sort projects by short name, ascending
pub fn sort_by_short_name(projects: &mut [Project]) {
    projects.sort_by(|a, b| a.short_name.cmp(&b.short_name));
}
