use std::sync::Arc;

use api_server::orders::{router, OrderState};
use application::OrderApp;
use config::ServiceConfig;
use domain::AuthTokens;
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

    info!("🚀 Starting order service");

    let config = ServiceConfig::orders();
    info!("💾 Using database: {}", config.database_path);

    let broker = Arc::new(InMemoryBroker::new());
    let app = OrderApp::new(&config.database_path, broker.clone());
    app.start_payment_consumer(&broker);

    let state = OrderState {
        service: Arc::clone(&app.order_service),
        tokens: AuthTokens::new(&config.jwt_secret, config.token_ttl_secs),
    };
    let app = router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("🌐 Order API listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
