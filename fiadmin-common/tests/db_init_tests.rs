//! Database initialization tests

use fiadmin_common::db::init::{create_schema, init_database};
use tempfile::TempDir;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("fiadmin.db");

    let result = init_database(&db_path).await;
    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("fiadmin.db");

    let pool1 = init_database(&db_path).await.unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());
}

#[tokio::test]
async fn test_schema_creation_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("fiadmin.db")).await.unwrap();

    create_schema(&pool).await.expect("second schema pass should be a no-op");
}

#[tokio::test]
async fn test_all_tables_created() {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("fiadmin.db")).await.unwrap();

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    for expected in [
        "reference",
        "reference_source",
        "reference_analytic",
        "descriptor",
        "thematic_area",
        "resource_thematic",
        "attachment",
        "reference_alternate_id",
        "reference_local",
        "reference_complement",
        "indexed_database",
        "reference_indexed_database",
    ] {
        assert!(
            tables.iter().any(|t| t == expected),
            "Missing table {}: {:?}",
            expected,
            tables
        );
    }
}
