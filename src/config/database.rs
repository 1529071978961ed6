//! PostgreSQL connection pool initialization.
//!
//! The connection string is read from `DATABASE_URL`. The returned pool is
//! cheaply cloneable and lives in [`crate::state::AppState`] for the whole
//! process lifetime.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::env;

/// Connects to the database named by `DATABASE_URL`.
///
/// # Panics
///
/// Panics if the variable is unset or the connection cannot be established;
/// the server is useless without its store, so startup is the right place
/// to fail.
pub async fn init_db_pool() -> PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database")
}
