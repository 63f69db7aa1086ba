use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};

pub mod schema;
pub use schema::*;

pub type SqlitePool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

const SCHEMA_SQL: &str = include_str!("schema.sql");

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub fn new(database_path: &str) -> Self {
        let manager = ConnectionManager::<SqliteConnection>::new(database_path);
        let pool = r2d2::Pool::builder()
            .build(manager)
            .expect("Failed to create SQLite connection pool");

        let mut conn = pool
            .get()
            .expect("Failed to check out a connection for schema setup");
        conn.batch_execute(SCHEMA_SQL)
            .expect("Failed to initialize database schema");

        Database { pool }
    }

    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }
}
