use std::sync::Arc;

use api_server::users::{router, UserState};
use application::UserApp;
use config::ServiceConfig;
use domain::AuthTokens;
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

    info!("🚀 Starting user service");

    let config = ServiceConfig::users();
    info!("💾 Using database: {}", config.database_path);

    let tokens = AuthTokens::new(&config.jwt_secret, config.token_ttl_secs);
    let app = UserApp::new(&config.database_path, tokens.clone());

    let state = UserState {
        service: Arc::clone(&app.user_service),
        tokens,
    };
    let app = router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("🌐 User API listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
