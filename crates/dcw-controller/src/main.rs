#![doc = include_str!("../README.md")]

mod controller;

use clap::Parser;
use controller::config::{CliArgs, ControllerConfig};
use controller::runner::Controller;
use controller::telemetry::init_telemetry;
use tokio::signal;
use tokio_util::sync::CancellationToken;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ControllerConfig::try_from(args)?;

    let providers = init_telemetry()?;

    let result = run(config).await;
    if let Err(e) = &result {
        tracing::error!("Controller stopped: {:#}", e);
    }

    providers.shutdown();
    result
}

async fn run(config: ControllerConfig) -> anyhow::Result<()> {
    let controller = Controller::start(&config).await?;
    log_startup_info(&controller, &config);

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let summary = controller.run(shutdown).await?;
    if summary.exhausted {
        tracing::info!("Candidate space exhausted");
    }
    Ok(())
}

fn log_startup_info(controller: &Controller, config: &ControllerConfig) {
    if cfg!(debug_assertions) {
        tracing::info!(
            "Dispatching to {} with full config: {:#?}",
            config.client.addr(),
            config
        );
    } else {
        tracing::info!(
            "Dispatching batches of {} to {}",
            config.batch_size,
            config.client.addr()
        );
    }

    match controller.generator().config().space_size() {
        Some(size) => tracing::info!("Candidate space holds {} candidates", size),
        None => tracing::info!("Candidate space exceeds 2^128 candidates"),
    }
}

/// Cancels `shutdown` on Ctrl+C or SIGTERM. The controller finishes the batch
/// in flight and persists before exiting.
async fn shutdown_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }

    tracing::info!("Shutdown signal received, finishing the current batch...");
    shutdown.cancel();
}
