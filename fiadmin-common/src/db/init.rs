//! Database initialization
//!
//! Creates the bibliographic schema on first run. Every statement is
//! idempotent, so opening an existing database is safe.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create every table and index (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_reference_table(pool).await?;
    create_reference_source_table(pool).await?;
    create_reference_analytic_table(pool).await?;
    create_descriptor_table(pool).await?;
    create_thematic_area_tables(pool).await?;
    create_attachment_table(pool).await?;
    create_alternate_id_table(pool).await?;
    create_library_record_table(pool).await?;
    create_complement_table(pool).await?;
    create_indexed_database_tables(pool).await?;
    Ok(())
}

/// Create the reference table
///
/// Base record shared by Source and Analytic references. JSON columns hold
/// repeatable subfielded values.
pub async fn create_reference_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reference (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            status INTEGER NOT NULL DEFAULT 0,
            treatment_level TEXT NOT NULL,
            literature_type TEXT NOT NULL DEFAULT '',
            cooperative_center_code TEXT NOT NULL DEFAULT '',
            record_type TEXT,
            item_form TEXT,
            call_number TEXT,
            electronic_address TEXT,
            text_language TEXT,
            descriptive_information TEXT,
            publication_date TEXT,
            publication_date_normalized TEXT,
            total_number_of_references TEXT,
            general_note TEXT,
            formatted_contents_note TEXT,
            additional_physical_form_available_note TEXT,
            reproduction_note TEXT,
            original_version_note TEXT,
            internal_note TEXT,
            abstract TEXT,
            author_keyword TEXT,
            doi TEXT,
            transfer_date_to_database TEXT,
            created_date TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            update_date TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reference_status ON reference(status)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reference_update_date ON reference(update_date)")
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn create_reference_source_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reference_source (
            reference_id INTEGER PRIMARY KEY REFERENCES reference(id) ON DELETE CASCADE,
            title_serial TEXT,
            volume_serial TEXT,
            issue_number TEXT,
            issn TEXT,
            individual_author_monographic TEXT,
            corporate_author_monographic TEXT,
            title_monographic TEXT,
            english_title_monographic TEXT,
            pages_monographic TEXT,
            volume_monographic TEXT,
            publisher TEXT,
            edition TEXT,
            publication_city TEXT,
            publication_country TEXT,
            symbol TEXT,
            isbn TEXT,
            individual_author_collection TEXT,
            corporate_author_collection TEXT,
            title_collection TEXT,
            english_title_collection TEXT,
            total_number_of_volumes TEXT,
            thesis_dissertation_leader TEXT,
            thesis_dissertation_institution TEXT,
            thesis_dissertation_academic_title TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_reference_analytic_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reference_analytic (
            reference_id INTEGER PRIMARY KEY REFERENCES reference(id) ON DELETE CASCADE,
            source_id INTEGER REFERENCES reference_source(reference_id) ON DELETE SET NULL,
            individual_author TEXT,
            corporate_author TEXT,
            title TEXT,
            english_translated_title TEXT,
            pages TEXT,
            clinical_trial_registry_name TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_reference_analytic_source ON reference_analytic(source_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the descriptor table
///
/// Polymorphic: (content_type, object_id) points at a Source or Analytic row.
pub async fn create_descriptor_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS descriptor (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            object_id INTEGER NOT NULL,
            content_type TEXT NOT NULL,
            code TEXT,
            text TEXT,
            is_primary INTEGER NOT NULL DEFAULT 0,
            status INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_descriptor_object ON descriptor(content_type, object_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_thematic_area_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS thematic_area (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            acronym TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS resource_thematic (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            object_id INTEGER NOT NULL,
            content_type TEXT NOT NULL,
            thematic_area_id INTEGER NOT NULL REFERENCES thematic_area(id),
            status INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_resource_thematic_object ON resource_thematic(content_type, object_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_attachment_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attachment (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            object_id INTEGER NOT NULL,
            content_type TEXT NOT NULL,
            attachment_file TEXT NOT NULL,
            short_url TEXT NOT NULL,
            language TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_attachment_object ON attachment(content_type, object_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_alternate_id_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reference_alternate_id (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            reference_id INTEGER NOT NULL REFERENCES reference(id) ON DELETE CASCADE,
            alternate_id TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the per-holding-library table
///
/// `database` holds one acronym per line.
pub async fn create_library_record_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reference_local (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source_id INTEGER NOT NULL REFERENCES reference(id) ON DELETE CASCADE,
            cooperative_center_code TEXT,
            call_number TEXT,
            "database" TEXT,
            inventory_number TEXT,
            internal_note TEXT,
            local_descriptors TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_complement_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reference_complement (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source_id INTEGER NOT NULL UNIQUE REFERENCES reference(id) ON DELETE CASCADE,
            conference_sponsoring_institution TEXT,
            conference_name TEXT,
            conference_date TEXT,
            conference_normalized_date TEXT,
            conference_city TEXT,
            conference_country TEXT,
            project_sponsoring_institution TEXT,
            project_name TEXT,
            project_number TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_indexed_database_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS indexed_database (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            acronym TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reference_indexed_database (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            reference_id INTEGER NOT NULL REFERENCES reference(id) ON DELETE CASCADE,
            database_id INTEGER NOT NULL REFERENCES indexed_database(id),
            UNIQUE (reference_id, database_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
