//! Server state

use std::sync::Arc;

use crate::ci::proxy::BuildServerProxy;
use crate::containers::ContainerEngine;
use crate::registry::Registry;

/// Server state shared across handlers
pub struct ServerState {
    pub registry: Arc<Registry>,
    pub ci: Arc<dyn BuildServerProxy>,
    pub containers: Arc<dyn ContainerEngine>,
}

impl ServerState {
    pub fn new(
        registry: Arc<Registry>,
        ci: Arc<dyn BuildServerProxy>,
        containers: Arc<dyn ContainerEngine>,
    ) -> Self {
        Self {
            registry,
            ci,
            containers,
        }
    }
}
