//! StreamNest Database Layer
//!
//! PostgreSQL persistence for the StreamNest account backend.
//!
//! # Architecture
//!
//! - **accounts**: identity + credential records, the single stored refresh
//!   token per account, and the watch-history array
//! - **subscriptions**: directed subscriber -> channel edges, read-only from
//!   this layer's consumers
//!
//! # Repository Pattern
//!
//! Each domain has its own repository. The auth layer consumes repositories
//! through the [`store::CredentialStore`] and [`store::SubscriptionStore`]
//! traits, so tests can substitute the in-memory [`mock::MemoryStore`]
//! (behind the `mock` feature).

pub mod config;
pub mod error;
pub mod models;
pub mod repos;
pub mod store;

#[cfg(feature = "mock")]
pub mod mock;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

pub use config::DatabaseConfig;
pub use error::{DbError, DbResult};
pub use models::*;
pub use repos::*;
pub use store::{CredentialStore, SubscriptionStore};

/// Database connection pool
pub struct Database {
    /// PostgreSQL connection pool
    pub pg: PgPool,
}

impl Database {
    /// Connect to PostgreSQL
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        info!("Connecting to PostgreSQL: {}", config.postgres_url_masked());

        let pg = PgPoolOptions::new()
            .max_connections(config.pg_max_connections)
            .min_connections(config.pg_min_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.pg_acquire_timeout_secs))
            .connect(&config.postgres_url)
            .await
            .map_err(|e| DbError::Connection(format!("PostgreSQL: {}", e)))?;

        info!("Connected to PostgreSQL");

        Ok(Self { pg })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> DbResult<()> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&self.pg)
            .await
            .map_err(|e| DbError::Migration(e.to_string()))?;
        info!("Migrations complete");
        Ok(())
    }

    /// Health check
    pub async fn health_check(&self) -> DbResult<bool> {
        let ok = sqlx::query("SELECT 1").fetch_one(&self.pg).await.is_ok();
        Ok(ok)
    }

    /// Create repository instances
    pub fn account_repo(&self) -> AccountRepo {
        AccountRepo::new(self.pg.clone())
    }

    pub fn subscription_repo(&self) -> SubscriptionRepo {
        SubscriptionRepo::new(self.pg.clone())
    }
}
