// SPDX-License-Identifier: MIT

//! LendHub API Server
//!
//! Rental-marketplace backend: serves the authentication core (signup,
//! login, token refresh) and the protected user routes behind the
//! authorization gate.

use lendhub::{config::Config, db::Database, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment. The JWT signing secret is read
    // exactly once here and is immutable for the process lifetime.
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting LendHub API");

    // Connect to the database and run migrations
    let db = Database::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Build shared state and router
    let state = Arc::new(AppState::new(config.clone(), db));
    let app = lendhub::routes::create_router(state);

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

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lendhub=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
