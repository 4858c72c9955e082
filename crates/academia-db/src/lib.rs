//! # Academia DB
//!
//! PostgreSQL connection pool initialization and migrations.
//!
//! # Example
//!
//! ```ignore
//! use academia_db::{init_db_pool, run_migrations};
//!
//! let pool = init_db_pool(&database_url).await?;
//! run_migrations(&pool).await?;
//! ```

use sqlx::postgres::PgPoolOptions;

/// Connects a PostgreSQL pool to `database_url`.
///
/// The returned pool is cheaply cloneable and should be shared through the
/// application state.
pub async fn init_db_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Applies the migrations bundled from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

// Re-export PgPool for convenience
pub use sqlx::PgPool;
