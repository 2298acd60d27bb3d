use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use concierge_leads_api::catalog::VehicleCatalog;
use concierge_leads_api::config::Config;
use concierge_leads_api::handlers::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "concierge_leads_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration once; components receive it explicitly
    let config = Config::from_env()?;
    let port = config.port;

    // Parse the embedded vehicle dataset
    let catalog = VehicleCatalog::from_embedded()?;

    let state = Arc::new(AppState::new(config, catalog));
    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
