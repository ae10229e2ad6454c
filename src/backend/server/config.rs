/**
 * Server Persistence Setup
 *
 * Connects to PostgreSQL when a database URL is configured and runs the
 * embedded migrations.
 *
 * # Error Handling
 *
 * Database errors are logged but do not prevent server startup. When the
 * database is unavailable the server falls back to the in-memory store.
 */

use std::sync::Arc;

use sqlx::PgPool;

use crate::backend::store::{MemoryStore, PgStore, Store};
use crate::shared::AppConfig;

/// Database configuration result
///
/// Contains the database connection pool if successfully configured,
/// or `None` if the database is not available.
pub type DatabaseConfig = Option<PgPool>;

/// Load and initialize database connection pool
///
/// This function:
/// 1. Reads the database URL from the configuration
/// 2. Creates a PostgreSQL connection pool
/// 3. Runs database migrations
///
/// # Returns
///
/// - `Some(PgPool)` if database is successfully configured
/// - `None` if no URL is configured or the connection fails
pub async fn load_database(config: &AppConfig) -> DatabaseConfig {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("[Server] DATABASE_URL not set. Using the in-memory store.");
        return None;
    };

    tracing::info!("[Server] Connecting to database...");

    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("[Server] Failed to create database connection pool: {}", e);
            tracing::warn!("[Server] Falling back to the in-memory store.");
            return None;
        }
    };

    tracing::info!("[Server] Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(_) => {
            tracing::info!("[Server] Database migrations completed successfully");
        }
        Err(e) => {
            tracing::error!("[Server] Failed to run database migrations: {}", e);
            tracing::warn!("[Server] Continuing; the schema might not be up to date");
        }
    }

    Some(pool)
}

/// Pick the store implementation for the configured environment
pub async fn load_store(config: &AppConfig) -> Arc<dyn Store> {
    match load_database(config).await {
        Some(pool) => Arc::new(PgStore::new(pool)),
        None => Arc::new(MemoryStore::new()),
    }
}
