//! Build server reconnection worker

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::ci::proxy::CiProxy;
use crate::ci::server::BuildServerConnector;

/// Reconnect worker options
#[derive(Debug, Clone)]
pub struct Options {
    /// Delay between attempts
    pub interval: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

/// Retry the connection on a fixed interval until it succeeds or `cancel`
/// fires. On success the live connection is installed into `proxy` and the
/// worker exits.
pub async fn run<S, F>(
    options: &Options,
    connector: &dyn BuildServerConnector,
    proxy: &CiProxy,
    sleep_fn: S,
    cancel: CancellationToken,
) where
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    info!("Reconnect worker starting...");
    let mut attempt: u64 = 0;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Reconnect worker shutting down...");
                return;
            }
            _ = sleep_fn(options.interval) => {}
        }

        attempt += 1;
        warn!("Retrying build server connection (attempt {})", attempt);

        match connector.connect().await {
            Ok(server) => {
                proxy.install(server).await;
                info!("Connected to build server after {} attempts", attempt);
                return;
            }
            Err(e) => {
                warn!(
                    "Build server still unreachable: {}. Next attempt in {:?}",
                    e, options.interval
                );
            }
        }
    }
}
