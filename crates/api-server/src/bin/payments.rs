use std::sync::Arc;

use api_server::grpc;
use api_server::payments::{router, PaymentState};
use application::PaymentApp;
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

    info!("🚀 Starting payment service");

    let config = ServiceConfig::payments();
    info!("💾 Using database: {}", config.database_path);

    let broker = Arc::new(InMemoryBroker::new());
    let app = PaymentApp::new(&config.database_path, broker.clone());
    let tokens = AuthTokens::new(&config.jwt_secret, config.token_ttl_secs);

    let state = PaymentState {
        service: Arc::clone(&app.payment_service),
        tokens: tokens.clone(),
    };
    let http = router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let bind_address = config.bind_address();
    let grpc_address = config.grpc_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("🌐 Payment API listening on http://{}", bind_address);
    info!("📡 Payment gRPC listening on {}", grpc_address);

    let grpc_service = Arc::clone(&app.payment_service);
    tokio::try_join!(
        async { axum::serve(listener, http).await.map_err(anyhow::Error::from) },
        async {
            grpc::serve_grpc(grpc_service, tokens, &grpc_address)
                .await
                .map_err(anyhow::Error::from)
        },
    )?;

    Ok(())
}
