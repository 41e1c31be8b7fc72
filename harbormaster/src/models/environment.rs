//! Environment model

use serde::{Deserialize, Serialize};

/// A named deployment target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub id: u64,

    /// Case-insensitive lookup key
    pub name: String,

    pub hostname: String,

    /// URL of the control plane serving this environment
    #[serde(default, alias = "goobernetUrl")]
    pub control_url: String,

    /// First port handed out to deployments in this environment
    #[serde(default)]
    pub starting_port: u16,

    /// Container registry images are pulled from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,
}

impl Environment {
    /// Case-insensitive name comparison
    pub fn is_named(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}
