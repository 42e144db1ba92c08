// src/main.rs
//! Rollcall service binary.

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rollcall::{Config, NameRegistry, NetworkManager, ServiceError};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    config.validate()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.workers)
        .enable_all()
        .build()?;

    if let Err(e) = runtime.block_on(run(config)) {
        error!(error = %e, "registry service failed");
        return Err(e.into());
    }
    Ok(())
}

async fn run(config: Config) -> Result<(), ServiceError> {
    info!(
        bind_address = %config.bind_addr(),
        workers = config.workers,
        "rollcall starting"
    );

    let registry = Arc::new(NameRegistry::new());
    let listener = TcpListener::bind(config.bind_addr()).await?;

    let cancel = CancellationToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received");
        cancel_on_signal.cancel();
    });

    NetworkManager::new(registry.clone()).serve(listener, cancel).await?;

    info!(records = registry.len(), "rollcall shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
