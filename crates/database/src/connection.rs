use crate::error::DbError;
use configuration::DatabaseSettings;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

/// Establishes a connection pool to the PostgreSQL database.
///
/// The pool can be shared across the entire application; it is cheap to clone.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, DbError> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&settings.url)
        .await?;

    tracing::info!(max_connections = settings.max_connections, "Connected to the price cache database.");
    Ok(pool)
}

/// A utility function to run database migrations automatically.
///
/// Called at startup so the cache tables exist before the first request.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
