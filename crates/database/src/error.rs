use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("ratio store connection is not configured: {0}")]
    ConnectionConfigError(String),

    #[error("ratio store query failed: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("ratio store migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
}
