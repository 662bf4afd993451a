//! Related-row queries: descriptors, thematic areas, attachments, alternate
//! ids, indexed databases, library records and complements

use crate::db::models::{
    Attachment, ComplementRecord, Descriptor, LibraryRecord, ThematicArea, STATUS_PUBLISHED,
};
use crate::Result;
use sqlx::SqlitePool;

/// Active (status = 1) descriptors of a record, in insertion order
pub async fn list_descriptors(
    pool: &SqlitePool,
    content_type: &str,
    object_id: i64,
) -> Result<Vec<Descriptor>> {
    let descriptors = sqlx::query_as::<_, Descriptor>(
        "SELECT * FROM descriptor
         WHERE content_type = ? AND object_id = ? AND status = ?
         ORDER BY id",
    )
    .bind(content_type)
    .bind(object_id)
    .bind(STATUS_PUBLISHED)
    .fetch_all(pool)
    .await?;
    Ok(descriptors)
}

/// Thematic areas linked to a record by active links
pub async fn list_thematic_areas(
    pool: &SqlitePool,
    content_type: &str,
    object_id: i64,
) -> Result<Vec<ThematicArea>> {
    let areas = sqlx::query_as::<_, ThematicArea>(
        "SELECT ta.id, ta.acronym, ta.name
         FROM resource_thematic rt
         JOIN thematic_area ta ON ta.id = rt.thematic_area_id
         WHERE rt.content_type = ? AND rt.object_id = ? AND rt.status = ?
         ORDER BY rt.id",
    )
    .bind(content_type)
    .bind(object_id)
    .bind(STATUS_PUBLISHED)
    .fetch_all(pool)
    .await?;
    Ok(areas)
}

pub async fn list_attachments(
    pool: &SqlitePool,
    content_type: &str,
    object_id: i64,
) -> Result<Vec<Attachment>> {
    let attachments = sqlx::query_as::<_, Attachment>(
        "SELECT * FROM attachment WHERE content_type = ? AND object_id = ? ORDER BY id",
    )
    .bind(content_type)
    .bind(object_id)
    .fetch_all(pool)
    .await?;
    Ok(attachments)
}

pub async fn list_alternate_ids(pool: &SqlitePool, reference_id: i64) -> Result<Vec<String>> {
    let ids = sqlx::query_scalar(
        "SELECT alternate_id FROM reference_alternate_id WHERE reference_id = ? ORDER BY id",
    )
    .bind(reference_id)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

/// Acronyms of the databases a reference is indexed in
pub async fn list_indexed_databases(pool: &SqlitePool, reference_id: i64) -> Result<Vec<String>> {
    let acronyms = sqlx::query_scalar(
        "SELECT d.acronym
         FROM reference_indexed_database rid
         JOIN indexed_database d ON d.id = rid.database_id
         WHERE rid.reference_id = ?
         ORDER BY rid.id",
    )
    .bind(reference_id)
    .fetch_all(pool)
    .await?;
    Ok(acronyms)
}

pub async fn get_complement(
    pool: &SqlitePool,
    reference_id: i64,
) -> Result<Option<ComplementRecord>> {
    let complement = sqlx::query_as::<_, ComplementRecord>(
        "SELECT * FROM reference_complement WHERE source_id = ?",
    )
    .bind(reference_id)
    .fetch_optional(pool)
    .await?;
    Ok(complement)
}

/// Holding library rows of a reference, oldest first
pub async fn list_library_records(
    pool: &SqlitePool,
    reference_id: i64,
) -> Result<Vec<LibraryRecord>> {
    let records = sqlx::query_as::<_, LibraryRecord>(
        "SELECT * FROM reference_local WHERE source_id = ? ORDER BY id",
    )
    .bind(reference_id)
    .fetch_all(pool)
    .await?;
    Ok(records)
}

pub async fn save_descriptor(pool: &SqlitePool, descriptor: &Descriptor) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO descriptor (object_id, content_type, code, text, is_primary, status)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(descriptor.object_id)
    .bind(&descriptor.content_type)
    .bind(&descriptor.code)
    .bind(&descriptor.text)
    .bind(descriptor.primary)
    .bind(descriptor.status)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn save_thematic_area(pool: &SqlitePool, acronym: &str, name: &str) -> Result<i64> {
    let result = sqlx::query("INSERT INTO thematic_area (acronym, name) VALUES (?, ?)")
        .bind(acronym)
        .bind(name)
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn link_thematic_area(
    pool: &SqlitePool,
    content_type: &str,
    object_id: i64,
    thematic_area_id: i64,
    status: i64,
) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO resource_thematic (object_id, content_type, thematic_area_id, status)
         VALUES (?, ?, ?, ?)",
    )
    .bind(object_id)
    .bind(content_type)
    .bind(thematic_area_id)
    .bind(status)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn save_attachment(pool: &SqlitePool, attachment: &Attachment) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO attachment (object_id, content_type, attachment_file, short_url, language)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(attachment.object_id)
    .bind(&attachment.content_type)
    .bind(&attachment.attachment_file)
    .bind(&attachment.short_url)
    .bind(&attachment.language)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn save_alternate_id(pool: &SqlitePool, reference_id: i64, alternate_id: &str) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO reference_alternate_id (reference_id, alternate_id) VALUES (?, ?)",
    )
    .bind(reference_id)
    .bind(alternate_id)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn save_indexed_database(pool: &SqlitePool, acronym: &str, name: &str) -> Result<i64> {
    let result = sqlx::query("INSERT INTO indexed_database (acronym, name) VALUES (?, ?)")
        .bind(acronym)
        .bind(name)
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn link_indexed_database(
    pool: &SqlitePool,
    reference_id: i64,
    database_id: i64,
) -> Result<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO reference_indexed_database (reference_id, database_id) VALUES (?, ?)",
    )
    .bind(reference_id)
    .bind(database_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn save_library_record(pool: &SqlitePool, record: &LibraryRecord) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO reference_local (
            source_id, cooperative_center_code, call_number, "database",
            inventory_number, internal_note, local_descriptors
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.source_id)
    .bind(&record.cooperative_center_code)
    .bind(&record.call_number)
    .bind(&record.database)
    .bind(&record.inventory_number)
    .bind(&record.internal_note)
    .bind(&record.local_descriptors)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn save_complement(pool: &SqlitePool, complement: &ComplementRecord) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO reference_complement (
            source_id, conference_sponsoring_institution, conference_name,
            conference_date, conference_normalized_date, conference_city,
            conference_country, project_sponsoring_institution, project_name,
            project_number
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(complement.source_id)
    .bind(&complement.conference_sponsoring_institution)
    .bind(&complement.conference_name)
    .bind(&complement.conference_date)
    .bind(&complement.conference_normalized_date)
    .bind(&complement.conference_city)
    .bind(&complement.conference_country)
    .bind(&complement.project_sponsoring_institution)
    .bind(&complement.project_name)
    .bind(&complement.project_number)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}
