//! Main application run loop

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::app::options::{AppOptions, LifecycleOptions};
use crate::app::state::AppState;
use crate::ci::jenkins::JenkinsConnector;
use crate::ci::proxy::CiProxy;
use crate::ci::server::BuildServerConnector;
use crate::errors::HarborError;
use crate::server::serve::serve;
use crate::workers::reconnect;

/// Run the control plane until `shutdown_signal` resolves
pub async fn run(
    options: AppOptions,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), HarborError> {
    info!("Initializing harbormaster...");

    let cancel = CancellationToken::new();
    let mut shutdown_manager = ShutdownManager::new(cancel.clone(), options.lifecycle.clone());

    if let Err(e) = init(&options, &cancel, &mut shutdown_manager).await {
        error!("Failed to start harbormaster: {}", e);
        shutdown_manager.shutdown().await?;
        return Err(e);
    }

    shutdown_signal.await;
    info!("Shutdown signal received, shutting down...");

    shutdown_manager.shutdown().await
}

// =============================== INITIALIZATION ================================== //

async fn init(
    options: &AppOptions,
    cancel: &CancellationToken,
    shutdown_manager: &mut ShutdownManager,
) -> Result<(), HarborError> {
    let connector: Arc<dyn BuildServerConnector> =
        Arc::new(JenkinsConnector::new(options.jenkins.clone()));

    let app_state = AppState::init(&options.layout, connector.as_ref(), &options.docker_binary).await;

    if !app_state.ci.connected().await {
        init_reconnect_worker(
            options.reconnect_worker.clone(),
            connector,
            app_state.ci.clone(),
            shutdown_manager,
            cancel.child_token(),
        )?;
    }

    init_server(options, &app_state, shutdown_manager, cancel.child_token()).await
}

/// Spawn the worker that keeps retrying the build server connection
pub fn spawn_reconnect_worker(
    options: reconnect::Options,
    connector: Arc<dyn BuildServerConnector>,
    proxy: Arc<CiProxy>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        reconnect::run(
            &options,
            connector.as_ref(),
            proxy.as_ref(),
            tokio::time::sleep,
            cancel,
        )
        .await;
    })
}

fn init_reconnect_worker(
    options: reconnect::Options,
    connector: Arc<dyn BuildServerConnector>,
    proxy: Arc<CiProxy>,
    shutdown_manager: &mut ShutdownManager,
    cancel: CancellationToken,
) -> Result<(), HarborError> {
    info!("Initializing build server reconnect worker...");
    let handle = spawn_reconnect_worker(options, connector, proxy, cancel);
    shutdown_manager.with_reconnect_worker_handle(handle)
}

async fn init_server(
    options: &AppOptions,
    app_state: &AppState,
    shutdown_manager: &mut ShutdownManager,
    cancel: CancellationToken,
) -> Result<(), HarborError> {
    info!("Initializing HTTP server...");

    let server_handle = serve(
        &options.server,
        Arc::new(app_state.server_state()),
        cancel.cancelled_owned(),
    )
    .await?;

    shutdown_manager.with_server_handle(server_handle)
}

// ================================= SHUTDOWN ===================================== //

struct ShutdownManager {
    cancel: CancellationToken,
    lifecycle_options: LifecycleOptions,
    server_handle: Option<JoinHandle<Result<(), HarborError>>>,
    reconnect_worker_handle: Option<JoinHandle<()>>,
}

impl ShutdownManager {
    fn new(cancel: CancellationToken, lifecycle_options: LifecycleOptions) -> Self {
        Self {
            cancel,
            lifecycle_options,
            server_handle: None,
            reconnect_worker_handle: None,
        }
    }

    fn with_reconnect_worker_handle(&mut self, handle: JoinHandle<()>) -> Result<(), HarborError> {
        if self.reconnect_worker_handle.is_some() {
            return Err(HarborError::ShutdownError(
                "reconnect_handle already set".to_string(),
            ));
        }
        self.reconnect_worker_handle = Some(handle);
        Ok(())
    }

    fn with_server_handle(
        &mut self,
        handle: JoinHandle<Result<(), HarborError>>,
    ) -> Result<(), HarborError> {
        if self.server_handle.is_some() {
            return Err(HarborError::ShutdownError("server_handle already set".to_string()));
        }
        self.server_handle = Some(handle);
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), HarborError> {
        self.cancel.cancel();

        match tokio::time::timeout(
            self.lifecycle_options.max_shutdown_delay,
            self.shutdown_impl(),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(HarborError::ShutdownError(format!(
                "shutdown timed out after {:?}",
                self.lifecycle_options.max_shutdown_delay
            ))),
        }
    }

    async fn shutdown_impl(&mut self) -> Result<(), HarborError> {
        info!("Shutting down harbormaster...");

        // 1. Reconnect worker
        if let Some(handle) = self.reconnect_worker_handle.take() {
            handle.await.map_err(|e| HarborError::ShutdownError(e.to_string()))?;
        }

        // 2. HTTP server
        if let Some(handle) = self.server_handle.take() {
            handle.await.map_err(|e| HarborError::ShutdownError(e.to_string()))??;
        }

        info!("Shutdown complete");
        Ok(())
    }
}
