use std::future::IntoFuture;

use anyhow::{self, Error as AnyhowError};
use db::{DBService, DbErr};
use server::{AppState, config::ServerConfig, http};
use thiserror::Error;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, prelude::*};

const GRACEFUL_SHUTDOWN_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    Other(#[from] AnyhowError),
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    if let Err(e) = dotenv::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to load .env file: {e}");
        }
    }

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter_string = format!(
        "warn,server={level},db={level},utils={level},tower_http={level}",
        level = log_level
    );
    let env_filter = EnvFilter::try_new(filter_string)
        .map_err(|e| anyhow::anyhow!("Failed to create tracing filter: {e}"))?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .init();

    let config = ServerConfig::from_env()?;

    let db = match DBService::connect(&config.database_url).await {
        Ok(db) => db,
        Err(err) => {
            tracing::error!(error = %err, "Database connection error");
            return Err(err.into());
        }
    };

    let app_router = http::router(AppState::new(db));

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    let actual_port = listener.local_addr()?.port();

    tracing::info!(
        "Connected to DB & Server is running on http://{}:{}",
        config.host,
        actual_port
    );

    let shutdown_rx = spawn_shutdown_watcher();

    let server = axum::serve(listener, app_router)
        .with_graceful_shutdown(wait_for_watch_true(shutdown_rx.clone()))
        .into_future();
    tokio::pin!(server);

    let serve_result = tokio::select! {
        res = &mut server => res,
        _ = shutdown_deadline(shutdown_rx, GRACEFUL_SHUTDOWN_TIMEOUT) => {
            tracing::warn!(
                "Graceful shutdown timed out after {:?}, exiting immediately",
                GRACEFUL_SHUTDOWN_TIMEOUT
            );
            std::process::exit(130);
        }
    };

    serve_result?;
    tracing::info!("Server stopped");
    Ok(())
}

fn spawn_shutdown_watcher() -> watch::Receiver<bool> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            return;
        }

        tracing::info!("Shutdown signal received, starting graceful shutdown");
        let _ = shutdown_tx.send(true);
    });

    shutdown_rx
}

async fn wait_for_watch_true(mut rx: watch::Receiver<bool>) {
    loop {
        if *rx.borrow() {
            return;
        }

        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

async fn shutdown_deadline(rx: watch::Receiver<bool>, timeout: std::time::Duration) {
    wait_for_watch_true(rx).await;
    tokio::time::sleep(timeout).await;
}
