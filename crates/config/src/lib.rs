use std::env;

use dotenv::dotenv;

/// Configuration for one service binary, loaded from the environment with
/// per-service variable prefixes (`CATALOG_PORT`, `ORDERS_DATABASE_PATH`, ...).
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    /// Only used by the payment service, which also exposes gRPC.
    pub grpc_port: u16,
    pub database_path: String,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
}

impl ServiceConfig {
    pub fn catalog() -> Self {
        Self::load("CATALOG", 8081, "catalog.db")
    }

    pub fn orders() -> Self {
        Self::load("ORDERS", 8082, "orders.db")
    }

    pub fn payments() -> Self {
        Self::load("PAYMENTS", 8083, "payments.db")
    }

    pub fn users() -> Self {
        Self::load("USERS", 8084, "users.db")
    }

    fn load(prefix: &str, default_port: u16, default_db: &str) -> Self {
        // Load .env file if it exists
        dotenv().ok();

        ServiceConfig {
            host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),

            port: env::var(format!("{}_PORT", prefix))
                .unwrap_or_default()
                .parse()
                .unwrap_or(default_port),

            grpc_port: env::var(format!("{}_GRPC_PORT", prefix))
                .unwrap_or_default()
                .parse()
                .unwrap_or(50051),

            database_path: env::var(format!("{}_DATABASE_PATH", prefix))
                .unwrap_or_else(|_| default_db.to_string()),

            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "change-me".to_string()),

            token_ttl_secs: env::var("TOKEN_TTL_SECS")
                .unwrap_or_default()
                .parse()
                .unwrap_or(86_400),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn grpc_address(&self) -> String {
        format!("{}:{}", self.host, self.grpc_port)
    }
}
