use crate::error::DbError;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::env;
use std::time::Duration;

/// Opens the shared connection pool to the Postgres ratio store.
///
/// `DATABASE_URL` is read from the environment; a `.env` file is honored
/// when present so local runs don't need an exported variable. The pool is
/// cheap to clone and is shared across the batch pipeline and the query
/// surface.
pub async fn connect() -> Result<PgPool, DbError> {
    dotenvy::dotenv().ok();

    let database_url = env::var("DATABASE_URL")
        .map_err(|_| DbError::ConnectionConfigError("DATABASE_URL must be set".to_string()))?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&database_url)
        .await?;

    Ok(pool)
}

/// Applies any pending schema migrations so the ratio store matches the
/// version this binary was built against.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
