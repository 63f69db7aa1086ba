//! All four services in one process, sharing a single broker. Development
//! convenience: cross-service event flow works without external plumbing.

use std::sync::Arc;

use api_server::{catalog, grpc, orders, payments, users};
use application::{CatalogApp, OrderApp, PaymentApp, UserApp};
use axum::Router;
use config::ServiceConfig;
use domain::AuthTokens;
use infrastructure::InMemoryBroker;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

async fn serve(router: Router, bind_address: String, label: &'static str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("🌐 {} listening on http://{}", label, bind_address);
    axum::serve(
        listener,
        router
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http()),
    )
    .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .init();

    info!("🚀 Starting food-ordering platform (all services, shared broker)");

    let catalog_config = ServiceConfig::catalog();
    let order_config = ServiceConfig::orders();
    let payment_config = ServiceConfig::payments();
    let user_config = ServiceConfig::users();

    let broker = Arc::new(InMemoryBroker::new());
    let tokens = AuthTokens::new(&user_config.jwt_secret, user_config.token_ttl_secs);

    let catalog_app = CatalogApp::new(&catalog_config.database_path, broker.clone());
    catalog_app.start_popularity_consumer(&broker);

    let order_app = OrderApp::new(&order_config.database_path, broker.clone());
    order_app.start_payment_consumer(&broker);

    let payment_app = PaymentApp::new(&payment_config.database_path, broker.clone());
    let user_app = UserApp::new(&user_config.database_path, tokens.clone());

    let catalog_router = catalog::router(catalog::CatalogState {
        service: Arc::clone(&catalog_app.catalog_service),
    });
    let order_router = orders::router(orders::OrderState {
        service: Arc::clone(&order_app.order_service),
        tokens: tokens.clone(),
    });
    let payment_router = payments::router(payments::PaymentState {
        service: Arc::clone(&payment_app.payment_service),
        tokens: tokens.clone(),
    });
    let user_router = users::router(users::UserState {
        service: Arc::clone(&user_app.user_service),
        tokens: tokens.clone(),
    });

    let grpc_address = payment_config.grpc_address();
    let grpc_service = Arc::clone(&payment_app.payment_service);
    let grpc_tokens = tokens.clone();
    info!("📡 Payment gRPC listening on {}", grpc_address);

    tokio::try_join!(
        serve(catalog_router, catalog_config.bind_address(), "Catalog API"),
        serve(order_router, order_config.bind_address(), "Order API"),
        serve(payment_router, payment_config.bind_address(), "Payment API"),
        serve(user_router, user_config.bind_address(), "User API"),
        async {
            grpc::serve_grpc(grpc_service, grpc_tokens, &grpc_address)
                .await
                .map_err(anyhow::Error::from)
        },
    )?;

    Ok(())
}
