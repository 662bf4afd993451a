//! Reference queries: base records, subtypes, listing and deletion

use crate::db::models::{
    AnalyticRecord, Reference, ReferenceKind, ReferenceSubtype, SourceRecord, STATUS_PUBLISHED,
};
use crate::{Error, Result};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

/// Collection filters, applied on top of the published-only restriction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceFilter {
    /// Inclusive lower bound, `YYYY-MM-DD HH:MM:SS`
    pub update_date_gte: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD HH:MM:SS`
    pub update_date_lte: Option<String>,
    pub status: Option<i64>,
}

/// Fetch a reference by id regardless of status
pub async fn get_reference(pool: &SqlitePool, id: i64) -> Result<Option<Reference>> {
    let reference = sqlx::query_as::<_, Reference>("SELECT * FROM reference WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(reference)
}

/// Fetch a published (status = 1) reference by id
pub async fn get_published_reference(pool: &SqlitePool, id: i64) -> Result<Option<Reference>> {
    let reference =
        sqlx::query_as::<_, Reference>("SELECT * FROM reference WHERE id = ? AND status = ?")
            .bind(id)
            .bind(STATUS_PUBLISHED)
            .fetch_optional(pool)
            .await?;
    Ok(reference)
}

pub async fn get_source(pool: &SqlitePool, reference_id: i64) -> Result<Option<SourceRecord>> {
    let source =
        sqlx::query_as::<_, SourceRecord>("SELECT * FROM reference_source WHERE reference_id = ?")
            .bind(reference_id)
            .fetch_optional(pool)
            .await?;
    Ok(source)
}

pub async fn get_analytic(pool: &SqlitePool, reference_id: i64) -> Result<Option<AnalyticRecord>> {
    let analytic = sqlx::query_as::<_, AnalyticRecord>(
        "SELECT * FROM reference_analytic WHERE reference_id = ?",
    )
    .bind(reference_id)
    .fetch_optional(pool)
    .await?;
    Ok(analytic)
}

/// Fetch the concrete subtype row selected by the reference's treatment level
///
/// A reference without its subtype row is [`Error::MissingSubtype`].
pub async fn get_subtype(pool: &SqlitePool, reference: &Reference) -> Result<ReferenceSubtype> {
    let kind = reference.kind();
    let subtype = match kind {
        ReferenceKind::Source => get_source(pool, reference.id)
            .await?
            .map(ReferenceSubtype::Source),
        ReferenceKind::Analytic => get_analytic(pool, reference.id)
            .await?
            .map(ReferenceSubtype::Analytic),
    };

    subtype.ok_or(Error::MissingSubtype {
        reference_id: reference.id,
        kind,
    })
}

/// Highest reference id, including unpublished rows; 0 when empty
pub async fn max_reference_id(pool: &SqlitePool) -> Result<i64> {
    let max_id: Option<i64> = sqlx::query_scalar("SELECT MAX(id) FROM reference")
        .fetch_one(pool)
        .await?;
    Ok(max_id.unwrap_or(0))
}

fn push_published_filter<'a>(builder: &mut QueryBuilder<'a, Sqlite>, filter: &'a ReferenceFilter) {
    builder.push(" WHERE status = ").push_bind(STATUS_PUBLISHED);

    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(gte) = &filter.update_date_gte {
        builder.push(" AND update_date >= ").push_bind(gte.as_str());
    }
    if let Some(lte) = &filter.update_date_lte {
        builder.push(" AND update_date <= ").push_bind(lte.as_str());
    }
}

/// Count published references matching `filter`
pub async fn count_published_references(
    pool: &SqlitePool,
    filter: &ReferenceFilter,
) -> Result<i64> {
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM reference");
    push_published_filter(&mut builder, filter);

    let total: i64 = builder.build_query_scalar().fetch_one(pool).await?;
    Ok(total)
}

/// Page of published references matching `filter`, ordered by id
pub async fn list_published_references(
    pool: &SqlitePool,
    filter: &ReferenceFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Reference>> {
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM reference");
    push_published_filter(&mut builder, filter);
    builder
        .push(" ORDER BY id ASC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    let references = builder
        .build_query_as::<Reference>()
        .fetch_all(pool)
        .await?;
    Ok(references)
}

/// Insert a reference; `id <= 0` lets the database assign one.
/// Empty `created_date`/`update_date` default to the current timestamp.
pub async fn save_reference(pool: &SqlitePool, reference: &Reference) -> Result<i64> {
    let id = (reference.id > 0).then_some(reference.id);

    let result = sqlx::query(
        r#"
        INSERT INTO reference (
            id, status, treatment_level, literature_type, cooperative_center_code,
            record_type, item_form, call_number, electronic_address, text_language,
            descriptive_information, publication_date, publication_date_normalized,
            total_number_of_references, general_note, formatted_contents_note,
            additional_physical_form_available_note, reproduction_note,
            original_version_note, internal_note, abstract, author_keyword, doi,
            transfer_date_to_database, created_date, update_date
        ) VALUES (
            ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
            COALESCE(NULLIF(?, ''), CURRENT_TIMESTAMP),
            COALESCE(NULLIF(?, ''), CURRENT_TIMESTAMP)
        )
        "#,
    )
    .bind(id)
    .bind(reference.status)
    .bind(&reference.treatment_level)
    .bind(&reference.literature_type)
    .bind(&reference.cooperative_center_code)
    .bind(&reference.record_type)
    .bind(&reference.item_form)
    .bind(&reference.call_number)
    .bind(&reference.electronic_address)
    .bind(&reference.text_language)
    .bind(&reference.descriptive_information)
    .bind(&reference.publication_date)
    .bind(&reference.publication_date_normalized)
    .bind(&reference.total_number_of_references)
    .bind(&reference.general_note)
    .bind(&reference.formatted_contents_note)
    .bind(&reference.additional_physical_form_available_note)
    .bind(&reference.reproduction_note)
    .bind(&reference.original_version_note)
    .bind(&reference.internal_note)
    .bind(&reference.abstract_text)
    .bind(&reference.author_keyword)
    .bind(&reference.doi)
    .bind(&reference.transfer_date_to_database)
    .bind(&reference.created_date)
    .bind(&reference.update_date)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn save_source(pool: &SqlitePool, source: &SourceRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO reference_source (
            reference_id, title_serial, volume_serial, issue_number, issn,
            individual_author_monographic, corporate_author_monographic,
            title_monographic, english_title_monographic, pages_monographic,
            volume_monographic, publisher, edition, publication_city,
            publication_country, symbol, isbn, individual_author_collection,
            corporate_author_collection, title_collection, english_title_collection,
            total_number_of_volumes, thesis_dissertation_leader,
            thesis_dissertation_institution, thesis_dissertation_academic_title
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(source.reference_id)
    .bind(&source.title_serial)
    .bind(&source.volume_serial)
    .bind(&source.issue_number)
    .bind(&source.issn)
    .bind(&source.individual_author_monographic)
    .bind(&source.corporate_author_monographic)
    .bind(&source.title_monographic)
    .bind(&source.english_title_monographic)
    .bind(&source.pages_monographic)
    .bind(&source.volume_monographic)
    .bind(&source.publisher)
    .bind(&source.edition)
    .bind(&source.publication_city)
    .bind(&source.publication_country)
    .bind(&source.symbol)
    .bind(&source.isbn)
    .bind(&source.individual_author_collection)
    .bind(&source.corporate_author_collection)
    .bind(&source.title_collection)
    .bind(&source.english_title_collection)
    .bind(&source.total_number_of_volumes)
    .bind(&source.thesis_dissertation_leader)
    .bind(&source.thesis_dissertation_institution)
    .bind(&source.thesis_dissertation_academic_title)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn save_analytic(pool: &SqlitePool, analytic: &AnalyticRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO reference_analytic (
            reference_id, source_id, individual_author, corporate_author, title,
            english_translated_title, pages, clinical_trial_registry_name
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(analytic.reference_id)
    .bind(analytic.source_id)
    .bind(&analytic.individual_author)
    .bind(&analytic.corporate_author)
    .bind(&analytic.title)
    .bind(&analytic.english_translated_title)
    .bind(&analytic.pages)
    .bind(&analytic.clinical_trial_registry_name)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete a reference with its subtype row and every related row
///
/// Polymorphic descriptors, attachments and thematic links carry no foreign
/// key, so they are removed explicitly by content type. Returns `false` when
/// the reference does not exist.
pub async fn delete_reference(pool: &SqlitePool, id: i64) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let treatment_level: Option<String> =
        sqlx::query_scalar("SELECT treatment_level FROM reference WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

    let Some(treatment_level) = treatment_level else {
        return Ok(false);
    };
    let content_type = ReferenceKind::from_treatment_level(&treatment_level).content_type();

    for table in ["descriptor", "attachment", "resource_thematic"] {
        sqlx::query(&format!(
            "DELETE FROM {} WHERE content_type = ? AND object_id = ?",
            table
        ))
        .bind(content_type)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    }

    for (table, column) in [
        ("reference_alternate_id", "reference_id"),
        ("reference_indexed_database", "reference_id"),
        ("reference_local", "source_id"),
        ("reference_complement", "source_id"),
        ("reference_analytic", "reference_id"),
        ("reference_source", "reference_id"),
        ("reference", "id"),
    ] {
        sqlx::query(&format!("DELETE FROM {} WHERE {} = ?", table, column))
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    debug!(reference_id = id, content_type, "Deleted reference");

    Ok(true)
}
