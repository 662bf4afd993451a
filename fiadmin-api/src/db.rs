//! Read-only database access for the service

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::path::Path;

/// Connect to an existing database in read-only mode
///
/// The service never writes; schema creation and data loading belong to the
/// cataloguing side (`fiadmin_common::db::init_database`).
pub async fn connect_readonly(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        anyhow::bail!("Database not found: {}", db_path.display());
    }

    let db_url = format!("sqlite://{}?mode=ro", db_path.display());

    let pool = SqlitePool::connect(&db_url)
        .await
        .context("Failed to connect to database in read-only mode")?;

    Ok(pool)
}
