//! Main entry point for the conduct-score portal backend.
//!
//! This file initializes logging, loads configuration from the environment,
//! builds the application state against the external REST backend and
//! serves the Axum router until a shutdown signal arrives.

#![forbid(unsafe_code)]

use std::env;
use std::process::ExitCode;

use conduct_backend::{build_router, AppConfig, AppState};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = matches!(
        env::var("CONDUCT_LOG_JSON").as_deref(),
        Ok("1" | "true" | "TRUE")
    );
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    info!(?config, "configuration loaded");

    let addr = config.bind_addr;
    let state = match AppState::from_config(config) {
        Ok(state) => state,
        Err(err) => {
            error!(error = %err, "cannot build application state");
            return ExitCode::FAILURE;
        }
    };
    let reference = state.reference.clone();
    let app = build_router(state);

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%addr, error = %err, "cannot bind listener");
            return ExitCode::FAILURE;
        }
    };
    info!(%addr, "listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    reference.shutdown();
    match served {
        Ok(()) => {
            info!("server stopped");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "server failed");
            ExitCode::FAILURE
        }
    }
}
