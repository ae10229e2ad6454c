//! Database test fixtures
//!
//! PostgreSQL tests only run when `DATABASE_URL` points at a scratch
//! database; every fixture truncates the standup tables first.

use sqlx::PgPool;

/// Connect to `DATABASE_URL`, or `None` when unset
pub async fn create_test_pool() -> Option<PgPool> {
    let database_url = std::env::var("DATABASE_URL").ok()?;
    Some(
        PgPool::connect(&database_url)
            .await
            .expect("Failed to create test database pool"),
    )
}

/// Run database migrations for testing
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Remove all rows while preserving the schema
pub async fn cleanup_test_data(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("TRUNCATE TABLE user_submissions, sessions, groups, users RESTART IDENTITY CASCADE")
        .execute(pool)
        .await?;
    Ok(())
}

/// Migrated, emptied database
pub struct TestDatabase {
    pool: PgPool,
}

impl TestDatabase {
    /// `None` when no test database is configured
    pub async fn new() -> Option<Self> {
        let pool = create_test_pool().await?;
        run_migrations(&pool).await.expect("Failed to run migrations");
        cleanup_test_data(&pool)
            .await
            .expect("Failed to clean test data");
        Some(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
