pub mod models;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config;

/// Connect to the SQLite database and bring the schema up to date.
///
/// Foreign keys are enforced on every connection; the schema relies on
/// ON DELETE CASCADE / SET NULL for user removal.
pub async fn connect(url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config::config().database.max_connections)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        tracing::error!("Migration failed: {}", e);
        sqlx::Error::Migrate(Box::new(e))
    })?;

    Ok(pool)
}
