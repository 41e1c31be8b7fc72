//! Deployment models

use serde::{Deserialize, Serialize};

use crate::models::environment::Environment;
use crate::models::project::Project;

/// Persisted form of a deployment: foreign keys only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentJoin {
    pub project_id: u64,

    pub environment_id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Explicit address, overrides `hostname:port`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// A project running in an environment at a network location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub project: Project,
    pub environment: Environment,
    pub location: String,
}

impl Deployment {
    /// Materialise a join record against resolved entities
    pub fn resolve(join: &DeploymentJoin, project: Project, environment: Environment) -> Self {
        let location = match (&join.location, join.port) {
            (Some(location), _) if !location.is_empty() => location.clone(),
            (_, Some(port)) => format!("{}:{}", environment.hostname, port),
            _ => environment.hostname.clone(),
        };

        Self {
            project,
            environment,
            location,
        }
    }
}
