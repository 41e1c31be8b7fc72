//! Harbormaster - Entry Point
//!
//! Tracks projects, environments and deployments, and fronts a Jenkins
//! build server for job listing and creation.

use std::env;

use harbormaster::app::options::{AppOptions, ServerOptions};
use harbormaster::app::run::run;
use harbormaster::logs::{init_logging, LogOptions};
use harbormaster::storage::config::ServiceConfig;
use harbormaster::storage::layout::StorageLayout;
use harbormaster::utils::{parse_cli_args, version_info};

use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli_args = parse_cli_args(env::args().skip(1));

    // Print version and exit
    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version_info()) {
            Ok(version) => println!("{}", version),
            Err(e) => eprintln!("Failed to format version: {e}"),
        }
        return;
    }

    let layout = cli_args
        .get("data-dir")
        .map(StorageLayout::new)
        .unwrap_or_default();

    // Create the data directory on first run
    let created = match layout.setup().await {
        Ok(created) => created,
        Err(e) => {
            eprintln!("Unable to create data directory {}: {e}", layout.base_dir.display());
            return;
        }
    };

    let (config, config_error) = match layout.config_file().read_json::<ServiceConfig>().await {
        Ok(config) => (config, None),
        Err(e) => (ServiceConfig::default(), Some(e)),
    };

    // Initialize logging
    let log_options = LogOptions {
        log_level: config.log_level.clone(),
        json_format: config.log_json,
        ..Default::default()
    };
    if let Err(e) = init_logging(log_options) {
        println!("Failed to initialize logging: {e}");
    }

    if created {
        info!("Created new data directory at {}", layout.base_dir.display());
    }
    if let Some(e) = config_error {
        error!("Error reading config, using defaults: {}", e);
    }

    let mut options = AppOptions::from_config(layout, &config);
    options.server = ServerOptions {
        host: cli_args
            .get("host")
            .cloned()
            .unwrap_or(options.server.host),
        port: match cli_args.get("port").map(|p| p.parse::<u16>()) {
            Some(Ok(port)) => port,
            Some(Err(e)) => {
                error!("Invalid --port: {}", e);
                return;
            }
            None => options.server.port,
        },
    };

    info!("Starting harbormaster on port {}", options.server.port);
    if let Err(e) = run(options, await_shutdown_signal()).await {
        error!("Failed to run harbormaster: {e}");
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
                _ => {
                    error!("Failed to install signal handlers, falling back to Ctrl+C");
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
        info!("Ctrl+C received, shutting down...");
    }
}
