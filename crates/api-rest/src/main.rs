//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the LDP REST server on its own, configured only from the environment.
//!
//! ## Intended use
//! Useful for development and debugging. The workspace's main `ldp-run` binary also loads a
//! `.env` file before reading the same variables.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, ServerSettings};

/// Main entry point for the LDP REST API server
///
/// See [`ServerSettings::from_env`] for the environment variables read.
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - a setting is malformed or the data directory is missing,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = ServerSettings::from_env()?;
    let store = settings.build_store()?;

    tracing::info!(
        "-- Starting LDP REST API on {} for {} ({:?})",
        settings.addr,
        settings.config.root_url(),
        settings.storage
    );

    let listener = tokio::net::TcpListener::bind(&settings.addr).await?;
    axum::serve(listener, router(Arc::new(store))).await?;

    Ok(())
}
