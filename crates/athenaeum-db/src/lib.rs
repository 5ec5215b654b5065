//! # Athenaeum DB
//!
//! Persistence for the credential lifecycle.
//!
//! - [`store`]: the [`UserStore`] and [`PasswordResetStore`] contracts
//! - [`postgres`]: [`PgStore`], the PostgreSQL implementation
//! - `memory`: an in-process implementation for tests (`test-utils` feature)
//!
//! Single-use tokens are stored only as digests. Consuming a verification or
//! reset token is a single conditional update, so two racing consumers of the
//! same token can never both succeed.
//!
//! # Example
//!
//! ```ignore
//! use athenaeum_config::DatabaseConfig;
//! use athenaeum_db::{PgStore, init_db_pool, run_migrations};
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()?).await?;
//! run_migrations(&pool).await?;
//! let store = PgStore::new(pool);
//! ```

use std::time::Duration;

use athenaeum_config::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

pub mod error;
pub mod postgres;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

pub use error::StoreError;
pub use postgres::PgStore;
pub use store::{PasswordResetStore, ProfileChanges, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryStore;

// Re-export PgPool for convenience
pub use sqlx::PgPool;

/// Opens the PostgreSQL connection pool.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.url)
        .await?;

    info!(max_connections = config.max_connections, "database pool ready");
    Ok(pool)
}

/// Applies pending migrations from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}
