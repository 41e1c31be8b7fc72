//! Build job template model

use serde::{Deserialize, Serialize};

/// A parameterised build job definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTemplate {
    /// Identity of the template
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Template body, usually a Jenkins config.xml with placeholders
    #[serde(default)]
    pub content: String,
}
