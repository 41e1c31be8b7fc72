//! Service configuration file

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::logs::LogLevel;

/// Contents of `config.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Jenkins base URL
    #[serde(default = "default_jenkins_url")]
    pub jenkins_url: String,

    #[serde(default)]
    pub jenkins_username: String,

    #[serde(default)]
    pub jenkins_password: String,

    /// Default container registry
    #[serde(default)]
    pub registry: String,

    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub log_json: bool,

    /// Seconds between build server reconnection attempts
    #[serde(default = "default_reconnect_interval")]
    pub reconnect_interval_secs: u64,
}

fn default_jenkins_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_reconnect_interval() -> u64 {
    60
}

impl ServiceConfig {
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_secs(self.reconnect_interval_secs.max(1))
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            jenkins_url: default_jenkins_url(),
            jenkins_username: String::new(),
            jenkins_password: String::new(),
            registry: String::new(),
            log_level: LogLevel::Info,
            log_json: false,
            reconnect_interval_secs: default_reconnect_interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_takes_defaults() {
        let config: ServiceConfig =
            serde_json::from_str(r#"{"jenkinsUrl": "https://ci.example.com", "logLevel": "debug"}"#)
                .unwrap();
        assert_eq!(config.jenkins_url, "https://ci.example.com");
        assert_eq!(config.log_level, LogLevel::Debug);
        assert!(!config.log_json);
        assert_eq!(config.reconnect_interval(), Duration::from_secs(60));
    }
}
