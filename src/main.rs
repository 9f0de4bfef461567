use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{ServerSettings, router};

/// Main entry point for the LDP application
///
/// Loads `.env` if present, builds the configured store and serves it over REST.
///
/// # Environment Variables
/// - `LDP_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `LDP_ROOT_URL`: public root URL of the store (default: "http://localhost:3000/")
/// - `LDP_DATA_DIR`: data directory for the filesystem store (default: "ldp_data")
/// - `LDP_STORAGE`: `fs` or `memory` (default: "fs")
///
/// See [`ServerSettings::from_env`] for the content-type and sidecar settings.
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, startup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ldp_run=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = ServerSettings::from_env()?;
    let store = Arc::new(settings.build_store()?);

    tracing::info!(
        "++ Starting LDP REST on {} serving {} ({:?})",
        settings.addr,
        settings.config.root_url(),
        settings.storage
    );
    if settings.config.live() {
        tracing::info!("++ Advertising live updates via Updates-Via");
    }

    let listener = tokio::net::TcpListener::bind(&settings.addr).await?;
    axum::serve(listener, router(store)).await?;

    Ok(())
}
