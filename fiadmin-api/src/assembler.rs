//! Record Assembler
//!
//! Builds the flat, ISIS-compatible document of one reference out of the base
//! row, its Source or Analytic row and every related table. Fields are merged
//! first-writer-wins: a later step never replaces a non-empty value, except for
//! the additive lists and the holding-library step, which overwrites.

use std::sync::Arc;

use fiadmin_common::config::ServiceConfig;
use fiadmin_common::db::{
    get_complement, get_reference, get_source, get_subtype, list_alternate_ids, list_attachments,
    list_descriptors, list_indexed_databases, list_library_records, list_thematic_areas,
    Attachment, Descriptor, FieldList, Reference,
};
use serde_json::{json, Map, Value};
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};

/// Assembled record: field name → value, in insertion order
pub type Document = Map<String, Value>;

/// Marker stored in `source_control` once Source fields were folded in
pub const SOURCE_CONTROL_MARKER: &str = "FONTE";

/// Fields an Analytic record inherits from its Source
pub const SOURCE_INHERITED_FIELDS: &[&str] = &[
    "title_serial",
    "volume_serial",
    "issue_number",
    "issn",
    "publication_date",
    "publication_date_normalized",
    "individual_author_monographic",
    "corporate_author_monographic",
    "title_monographic",
    "english_title_monographic",
    "pages_monographic",
    "volume_monographic",
    "publisher",
    "edition",
    "publication_city",
    "publication_country",
    "isbn",
    "individual_author_collection",
    "corporate_author_collection",
    "title_collection",
    "english_title_collection",
    "total_number_of_volumes",
    "thesis_dissertation_leader",
    "thesis_dissertation_institution",
    "thesis_dissertation_academic_title",
];

/// Null, blank strings, `[]` and `{}` count as empty; numbers and booleans never do
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn has_value(doc: &Document, name: &str) -> bool {
    doc.get(name).map_or(false, |v| !is_empty_value(v))
}

/// Copy each non-empty value unless `doc` already holds a non-empty value for that name
pub fn merge_missing<I>(doc: &mut Document, fields: I)
where
    I: IntoIterator<Item = (&'static str, Value)>,
{
    for (name, value) in fields {
        if is_empty_value(&value) || has_value(doc, name) {
            continue;
        }
        doc.insert(name.to_string(), value);
    }
}

/// Copy each non-empty value, replacing whatever `doc` holds
pub fn merge_overwrite<I>(doc: &mut Document, fields: I)
where
    I: IntoIterator<Item = (&'static str, Value)>,
{
    for (name, value) in fields {
        if !is_empty_value(&value) {
            doc.insert(name.to_string(), value);
        }
    }
}

/// `{"text": code}`, or `{"text": "[free text]"}` for legacy uncoded descriptors
pub fn descriptor_entry(descriptor: &Descriptor) -> Value {
    match descriptor.code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => json!({ "text": code }),
        _ => json!({
            "text": format!("[{}]", descriptor.text.as_deref().unwrap_or("").trim())
        }),
    }
}

/// Electronic-address entry pointing at the public view of an attachment
pub fn attachment_entry(attachment: &Attachment, site_base_url: &str) -> Value {
    let extension = attachment.extension();
    let file_type = if extension == "pdf" { "PDF" } else { "TEXT" };
    let language: String = attachment.language.chars().take(2).collect();

    json!({
        "_u": format!("{}/document/view/{}", site_base_url, attachment.short_url),
        "_i": language,
        "_y": file_type,
        "_q": extension,
    })
}

/// Append entries to `electronic_address`, creating the list when absent
pub fn append_electronic_address(doc: &mut Document, entries: Vec<Value>) {
    if entries.is_empty() {
        return;
    }

    if let Some(existing) = doc.get_mut("electronic_address") {
        match existing {
            Value::Array(list) => {
                list.extend(entries);
                return;
            }
            // A single legacy entry becomes the head of the list
            other if !is_empty_value(other) => {
                let mut combined = vec![other.take()];
                combined.extend(entries);
                *other = Value::Array(combined);
                return;
            }
            _ => {}
        }
    }

    doc.insert("electronic_address".to_string(), Value::Array(entries));
}

/// Public URI of a reference
pub fn resource_uri(id: i64) -> String {
    format!("/api/v1/bibliographic/{}/", id)
}

/// Builds assembled documents from the database
#[derive(Clone)]
pub struct RecordAssembler {
    db: SqlitePool,
    config: Arc<ServiceConfig>,
}

impl RecordAssembler {
    pub fn new(db: SqlitePool, config: Arc<ServiceConfig>) -> Self {
        Self { db, config }
    }

    /// Assemble the document of reference `id`, whatever its status
    pub async fn assemble(&self, id: i64) -> ApiResult<Document> {
        let reference = get_reference(&self.db, id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("reference {}", id)))?;
        self.assemble_reference(&reference).await
    }

    /// Assemble the document of an already loaded reference
    pub async fn assemble_reference(&self, reference: &Reference) -> ApiResult<Document> {
        let id = reference.id;
        let mut doc = Document::new();

        merge_missing(&mut doc, reference.fields());
        doc.insert("id".to_string(), Value::from(id));
        doc.insert("MFN".to_string(), Value::from(id));
        doc.insert("resource_uri".to_string(), Value::String(resource_uri(id)));

        let subtype = get_subtype(&self.db, reference).await?;
        let content_type = subtype.kind().content_type();
        // Base values win over subtype values of the same name
        merge_missing(&mut doc, subtype.fields());

        if let Some(source_id) = doc.get("source").and_then(Value::as_i64) {
            self.merge_source(&mut doc, source_id).await?;
        }

        let version = tokio::fs::read_to_string(&self.config.version_file).await?;
        doc.insert(
            "version".to_string(),
            Value::String(version.trim().to_string()),
        );

        let descriptors = list_descriptors(&self.db, content_type, id).await?;
        let (primary, secondary): (Vec<&Descriptor>, Vec<&Descriptor>) =
            descriptors.iter().partition(|d| d.primary);
        doc.insert(
            "descriptors_primary".to_string(),
            Value::Array(primary.into_iter().map(descriptor_entry).collect()),
        );
        doc.insert(
            "descriptors_secondary".to_string(),
            Value::Array(secondary.into_iter().map(descriptor_entry).collect()),
        );

        let thematic_areas = list_thematic_areas(&self.db, content_type, id).await?;
        doc.insert(
            "thematic_areas".to_string(),
            Value::Array(
                thematic_areas
                    .iter()
                    .map(|area| json!({ "text": area.name }))
                    .collect(),
            ),
        );

        let alternate_ids = list_alternate_ids(&self.db, id).await?;
        doc.insert("alternate_ids".to_string(), json!(alternate_ids));

        let indexed_databases = list_indexed_databases(&self.db, id).await?;
        doc.insert("indexed_database".to_string(), json!(indexed_databases));

        let attachments = list_attachments(&self.db, content_type, id).await?;
        let entries = attachments
            .iter()
            .map(|a| attachment_entry(a, &self.config.site_base_url))
            .collect();
        append_electronic_address(&mut doc, entries);

        if let Some(complement) = get_complement(&self.db, id).await? {
            merge_missing(&mut doc, complement.fields());
        }

        let libraries = list_library_records(&self.db, id).await?;
        let mut databases: Vec<String> = Vec::new();
        for library in &libraries {
            merge_overwrite(&mut doc, library.fields());
            databases.extend(library.database_acronyms());
        }
        if !databases.is_empty() {
            doc.insert("database".to_string(), json!(databases));
        }

        debug!(
            reference_id = id,
            content_type,
            descriptors = descriptors.len(),
            attachments = attachments.len(),
            libraries = libraries.len(),
            "Assembled reference"
        );

        Ok(doc)
    }

    /// Fold the inherited fields of the Source an Analytic points at
    async fn merge_source(&self, doc: &mut Document, source_id: i64) -> ApiResult<()> {
        let Some(source_reference) = get_reference(&self.db, source_id).await? else {
            warn!(source_id, "Analytic points at a missing source reference");
            return Ok(());
        };

        let mut fields = source_reference.fields();
        if let Some(source) = get_source(&self.db, source_id).await? {
            fields.extend(source.fields());
        }

        merge_missing(
            doc,
            fields
                .into_iter()
                .filter(|(name, _)| SOURCE_INHERITED_FIELDS.contains(name)),
        );
        doc.insert(
            "source_control".to_string(),
            Value::String(SOURCE_CONTROL_MARKER.to_string()),
        );

        Ok(())
    }
}
