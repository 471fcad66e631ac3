use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database query failed: {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Stored data is invalid: {0}")]
    InvalidData(String),
}
