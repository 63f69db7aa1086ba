use std::sync::Arc;

use api_server::catalog::{router, CatalogState};
use application::CatalogApp;
use config::ServiceConfig;
use infrastructure::InMemoryBroker;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .init();

    info!("🚀 Starting catalog service");

    let config = ServiceConfig::catalog();
    info!("💾 Using database: {}", config.database_path);

    let broker = Arc::new(InMemoryBroker::new());
    let app = CatalogApp::new(&config.database_path, broker.clone());
    app.start_popularity_consumer(&broker);

    let state = CatalogState {
        service: Arc::clone(&app.catalog_service),
    };
    let app = router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("🌐 Catalog API listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
