//! Application state management

use std::sync::Arc;

use tracing::info;

use crate::ci::proxy::CiProxy;
use crate::ci::server::BuildServerConnector;
use crate::containers::{ContainerEngine, DockerCli};
use crate::registry::{FileStorage, Registry};
use crate::server::state::ServerState;
use crate::storage::layout::StorageLayout;

/// Main application state
pub struct AppState {
    /// Project, environment and deployment registry
    pub registry: Arc<Registry>,

    /// Build server proxy
    pub ci: Arc<CiProxy>,

    /// Container engine
    pub containers: Arc<dyn ContainerEngine>,
}

impl AppState {
    /// Load the registry and make the first build server connection attempt
    pub async fn init(
        layout: &StorageLayout,
        connector: &dyn BuildServerConnector,
        docker_binary: &str,
    ) -> Self {
        info!("Initializing application state...");

        let storage = Arc::new(FileStorage::new(layout.clone()));
        let registry = Arc::new(Registry::open(storage).await);
        let ci = Arc::new(CiProxy::connect(connector, registry.clone()).await);
        let containers: Arc<dyn ContainerEngine> = Arc::new(DockerCli::new(docker_binary));

        Self {
            registry,
            ci,
            containers,
        }
    }

    /// State handed to the HTTP handlers
    pub fn server_state(&self) -> ServerState {
        ServerState::new(
            self.registry.clone(),
            self.ci.clone(),
            self.containers.clone(),
        )
    }
}
