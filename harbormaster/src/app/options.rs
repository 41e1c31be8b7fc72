//! Application configuration options

use std::time::Duration;

use crate::ci::jenkins::JenkinsOptions;
use crate::storage::config::ServiceConfig;
use crate::storage::layout::StorageLayout;
use crate::workers::reconnect;

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Lifecycle configuration
    pub lifecycle: LifecycleOptions,

    /// Data directory
    pub layout: StorageLayout,

    /// Server configuration
    pub server: ServerOptions,

    /// Jenkins connection
    pub jenkins: JenkinsOptions,

    /// Reconnect worker options
    pub reconnect_worker: reconnect::Options,

    /// Docker executable used to list containers
    pub docker_binary: String,
}

impl AppOptions {
    /// Options for a data directory and its loaded configuration
    pub fn from_config(layout: StorageLayout, config: &ServiceConfig) -> Self {
        Self {
            layout,
            jenkins: JenkinsOptions {
                url: config.jenkins_url.clone(),
                username: config.jenkins_username.clone(),
                password: config.jenkins_password.clone(),
                ..Default::default()
            },
            reconnect_worker: reconnect::Options {
                interval: config.reconnect_interval(),
            },
            ..Default::default()
        }
    }
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            lifecycle: LifecycleOptions::default(),
            layout: StorageLayout::default(),
            server: ServerOptions::default(),
            jenkins: JenkinsOptions::default(),
            reconnect_worker: reconnect::Options::default(),
            docker_binary: "docker".to_string(),
        }
    }
}

/// Lifecycle options
#[derive(Debug, Clone)]
pub struct LifecycleOptions {
    /// Maximum delay for graceful shutdown
    pub max_shutdown_delay: Duration,
}

impl Default for LifecycleOptions {
    fn default() -> Self {
        Self {
            max_shutdown_delay: Duration::from_secs(30),
        }
    }
}

/// HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7777,
        }
    }
}
