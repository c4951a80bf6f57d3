// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! ShopWithUs API Server
//!
//! Serves the study pages and records each participant's cookie and LLM
//! data-use consent.

use shopwithus::{config::Config, services::Participants, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        store = %config.store_backend,
        public_dir = %config.public_dir.display(),
        "Starting ShopWithUs server"
    );

    let participants = Participants::from_config(&config).await?;

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        participants,
    });

    // Build router
    let app = shopwithus::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shopwithus=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
