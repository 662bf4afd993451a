//! Record models
//!
//! One struct per table. Each record type that feeds the assembled document
//! lists its output fields explicitly in [`FieldList::fields`], so the mapping
//! from columns to legacy field names is checked by the compiler.

use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;

/// Repeatable/subfielded value stored as JSON text
/// (e.g. `[{"text": "Smith, J", "_1": "USP"}]`)
pub type JsonField = Option<Json<Value>>;

/// Content type of Source records in polymorphic link tables
pub const CONTENT_TYPE_SOURCE: &str = "biblioref.referencesource";
/// Content type of Analytic records in polymorphic link tables
pub const CONTENT_TYPE_ANALYTIC: &str = "biblioref.referenceanalytic";

/// Published record status
pub const STATUS_PUBLISHED: i64 = 1;

/// Explicit output field list of a record
pub trait FieldList {
    /// `(output field name, value)` pairs in legacy schema order.
    /// Unset columns yield `Value::Null`.
    fn fields(&self) -> Vec<(&'static str, Value)>;
}

fn text(value: &Option<String>) -> Value {
    value
        .as_ref()
        .map(|v| Value::String(v.clone()))
        .unwrap_or(Value::Null)
}

fn json(value: &JsonField) -> Value {
    value.as_ref().map(|v| v.0.clone()).unwrap_or(Value::Null)
}

/// Concrete subtype of a Reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Source,
    Analytic,
}

impl ReferenceKind {
    /// Analytic treatment levels start with `a` (`as`, `am`, `amc`, `ams`);
    /// every other level (`s`, `m`, `mc`, `ms`, `c`, ...) is a Source.
    pub fn from_treatment_level(code: &str) -> Self {
        if code.trim().to_ascii_lowercase().starts_with('a') {
            ReferenceKind::Analytic
        } else {
            ReferenceKind::Source
        }
    }

    /// Content type used by descriptors, thematic links and attachments
    pub fn content_type(self) -> &'static str {
        match self {
            ReferenceKind::Source => CONTENT_TYPE_SOURCE,
            ReferenceKind::Analytic => CONTENT_TYPE_ANALYTIC,
        }
    }
}

/// Base bibliographic record
#[derive(Debug, Clone, Default, FromRow)]
pub struct Reference {
    pub id: i64,
    pub status: i64,
    pub treatment_level: String,
    pub literature_type: String,
    pub cooperative_center_code: String,
    pub record_type: Option<String>,
    pub item_form: Option<String>,
    pub call_number: JsonField,
    pub electronic_address: JsonField,
    pub text_language: JsonField,
    pub descriptive_information: JsonField,
    pub publication_date: Option<String>,
    pub publication_date_normalized: Option<String>,
    pub total_number_of_references: Option<String>,
    pub general_note: Option<String>,
    pub formatted_contents_note: Option<String>,
    pub additional_physical_form_available_note: Option<String>,
    pub reproduction_note: Option<String>,
    pub original_version_note: Option<String>,
    pub internal_note: Option<String>,
    #[sqlx(rename = "abstract")]
    pub abstract_text: JsonField,
    pub author_keyword: JsonField,
    pub doi: Option<String>,
    pub transfer_date_to_database: Option<String>,
    pub created_date: String,
    pub update_date: String,
}

impl Reference {
    pub fn kind(&self) -> ReferenceKind {
        ReferenceKind::from_treatment_level(&self.treatment_level)
    }
}

impl FieldList for Reference {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("status", Value::from(self.status)),
            (
                "cooperative_center_code",
                Value::String(self.cooperative_center_code.clone()),
            ),
            ("literature_type", Value::String(self.literature_type.clone())),
            ("treatment_level", Value::String(self.treatment_level.clone())),
            ("record_type", text(&self.record_type)),
            ("item_form", text(&self.item_form)),
            ("call_number", json(&self.call_number)),
            ("electronic_address", json(&self.electronic_address)),
            ("text_language", json(&self.text_language)),
            ("descriptive_information", json(&self.descriptive_information)),
            ("publication_date", text(&self.publication_date)),
            (
                "publication_date_normalized",
                text(&self.publication_date_normalized),
            ),
            (
                "total_number_of_references",
                text(&self.total_number_of_references),
            ),
            ("general_note", text(&self.general_note)),
            ("formatted_contents_note", text(&self.formatted_contents_note)),
            (
                "additional_physical_form_available_note",
                text(&self.additional_physical_form_available_note),
            ),
            ("reproduction_note", text(&self.reproduction_note)),
            ("original_version_note", text(&self.original_version_note)),
            ("internal_note", text(&self.internal_note)),
            ("abstract", json(&self.abstract_text)),
            ("author_keyword", json(&self.author_keyword)),
            ("doi", text(&self.doi)),
            (
                "transfer_date_to_database",
                text(&self.transfer_date_to_database),
            ),
            ("created_date", Value::String(self.created_date.clone())),
            ("update_date", Value::String(self.update_date.clone())),
        ]
    }
}

/// Serial/monographic level of a Source reference
#[derive(Debug, Clone, Default, FromRow)]
pub struct SourceRecord {
    pub reference_id: i64,
    pub title_serial: Option<String>,
    pub volume_serial: Option<String>,
    pub issue_number: Option<String>,
    pub issn: Option<String>,
    pub individual_author_monographic: JsonField,
    pub corporate_author_monographic: JsonField,
    pub title_monographic: JsonField,
    pub english_title_monographic: Option<String>,
    pub pages_monographic: Option<String>,
    pub volume_monographic: Option<String>,
    pub publisher: Option<String>,
    pub edition: Option<String>,
    pub publication_city: Option<String>,
    pub publication_country: Option<String>,
    pub symbol: Option<String>,
    pub isbn: Option<String>,
    pub individual_author_collection: JsonField,
    pub corporate_author_collection: JsonField,
    pub title_collection: JsonField,
    pub english_title_collection: Option<String>,
    pub total_number_of_volumes: Option<String>,
    pub thesis_dissertation_leader: JsonField,
    pub thesis_dissertation_institution: Option<String>,
    pub thesis_dissertation_academic_title: Option<String>,
}

impl FieldList for SourceRecord {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("title_serial", text(&self.title_serial)),
            ("volume_serial", text(&self.volume_serial)),
            ("issue_number", text(&self.issue_number)),
            ("issn", text(&self.issn)),
            (
                "individual_author_monographic",
                json(&self.individual_author_monographic),
            ),
            (
                "corporate_author_monographic",
                json(&self.corporate_author_monographic),
            ),
            ("title_monographic", json(&self.title_monographic)),
            ("english_title_monographic", text(&self.english_title_monographic)),
            ("pages_monographic", text(&self.pages_monographic)),
            ("volume_monographic", text(&self.volume_monographic)),
            ("publisher", text(&self.publisher)),
            ("edition", text(&self.edition)),
            ("publication_city", text(&self.publication_city)),
            ("publication_country", text(&self.publication_country)),
            ("symbol", text(&self.symbol)),
            ("isbn", text(&self.isbn)),
            (
                "individual_author_collection",
                json(&self.individual_author_collection),
            ),
            (
                "corporate_author_collection",
                json(&self.corporate_author_collection),
            ),
            ("title_collection", json(&self.title_collection)),
            ("english_title_collection", text(&self.english_title_collection)),
            ("total_number_of_volumes", text(&self.total_number_of_volumes)),
            (
                "thesis_dissertation_leader",
                json(&self.thesis_dissertation_leader),
            ),
            (
                "thesis_dissertation_institution",
                text(&self.thesis_dissertation_institution),
            ),
            (
                "thesis_dissertation_academic_title",
                text(&self.thesis_dissertation_academic_title),
            ),
        ]
    }
}

/// Analytic level (article) of a reference, linked to its Source
#[derive(Debug, Clone, Default, FromRow)]
pub struct AnalyticRecord {
    pub reference_id: i64,
    pub source_id: Option<i64>,
    pub individual_author: JsonField,
    pub corporate_author: JsonField,
    pub title: JsonField,
    pub english_translated_title: Option<String>,
    pub pages: JsonField,
    pub clinical_trial_registry_name: Option<String>,
}

impl FieldList for AnalyticRecord {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            (
                "source",
                self.source_id.map(Value::from).unwrap_or(Value::Null),
            ),
            ("individual_author", json(&self.individual_author)),
            ("corporate_author", json(&self.corporate_author)),
            ("title", json(&self.title)),
            ("english_translated_title", text(&self.english_translated_title)),
            ("pages", json(&self.pages)),
            (
                "clinical_trial_registry_name",
                text(&self.clinical_trial_registry_name),
            ),
        ]
    }
}

/// The one concrete subtype row of a Reference
#[derive(Debug, Clone)]
pub enum ReferenceSubtype {
    Source(SourceRecord),
    Analytic(AnalyticRecord),
}

impl ReferenceSubtype {
    pub fn kind(&self) -> ReferenceKind {
        match self {
            ReferenceSubtype::Source(_) => ReferenceKind::Source,
            ReferenceSubtype::Analytic(_) => ReferenceKind::Analytic,
        }
    }
}

impl FieldList for ReferenceSubtype {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        match self {
            ReferenceSubtype::Source(source) => source.fields(),
            ReferenceSubtype::Analytic(analytic) => analytic.fields(),
        }
    }
}

/// Subject descriptor attached by (content_type, object_id)
#[derive(Debug, Clone, Default, FromRow)]
pub struct Descriptor {
    pub id: i64,
    pub object_id: i64,
    pub content_type: String,
    /// DeCS identifier; empty for legacy free-text descriptors
    pub code: Option<String>,
    pub text: Option<String>,
    #[sqlx(rename = "is_primary")]
    pub primary: bool,
    pub status: i64,
}

/// Named thematic area
#[derive(Debug, Clone, Default, FromRow)]
pub struct ThematicArea {
    pub id: i64,
    pub acronym: String,
    pub name: String,
}

/// File attached by (content_type, object_id)
#[derive(Debug, Clone, Default, FromRow)]
pub struct Attachment {
    pub id: i64,
    pub object_id: i64,
    pub content_type: String,
    /// Stored file name, e.g. `2015/03/report.PDF`
    pub attachment_file: String,
    /// Token of the public view link
    pub short_url: String,
    pub language: String,
}

impl Attachment {
    /// Lowercase text after the last `.` of the file name; empty when none
    pub fn extension(&self) -> String {
        let file_name = self
            .attachment_file
            .rsplit('/')
            .next()
            .unwrap_or(&self.attachment_file);

        match file_name.rsplit_once('.') {
            Some((_, ext)) => ext.to_ascii_lowercase(),
            None => String::new(),
        }
    }
}

/// Holding library fields of a reference
#[derive(Debug, Clone, Default, FromRow)]
pub struct LibraryRecord {
    pub id: i64,
    pub source_id: i64,
    pub cooperative_center_code: Option<String>,
    pub call_number: JsonField,
    /// One database acronym per line
    pub database: Option<String>,
    pub inventory_number: Option<String>,
    pub internal_note: Option<String>,
    pub local_descriptors: Option<String>,
}

impl LibraryRecord {
    /// Acronyms of the multi-line `database` field, blank lines dropped
    pub fn database_acronyms(&self) -> Vec<String> {
        self.database
            .as_deref()
            .unwrap_or("")
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl FieldList for LibraryRecord {
    /// Excludes `id`, `source_id`, `cooperative_center_code` and the
    /// `database` list (see [`LibraryRecord::database_acronyms`])
    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("call_number", json(&self.call_number)),
            ("inventory_number", text(&self.inventory_number)),
            ("internal_note", text(&self.internal_note)),
            ("local_descriptors", text(&self.local_descriptors)),
        ]
    }
}

/// Event/project metadata complementing a reference
#[derive(Debug, Clone, Default, FromRow)]
pub struct ComplementRecord {
    pub id: i64,
    pub source_id: i64,
    pub conference_sponsoring_institution: JsonField,
    pub conference_name: Option<String>,
    pub conference_date: Option<String>,
    pub conference_normalized_date: Option<String>,
    pub conference_city: Option<String>,
    pub conference_country: Option<String>,
    pub project_sponsoring_institution: JsonField,
    pub project_name: Option<String>,
    pub project_number: Option<String>,
}

impl FieldList for ComplementRecord {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            (
                "conference_sponsoring_institution",
                json(&self.conference_sponsoring_institution),
            ),
            ("conference_name", text(&self.conference_name)),
            ("conference_date", text(&self.conference_date)),
            (
                "conference_normalized_date",
                text(&self.conference_normalized_date),
            ),
            ("conference_city", text(&self.conference_city)),
            ("conference_country", text(&self.conference_country)),
            (
                "project_sponsoring_institution",
                json(&self.project_sponsoring_institution),
            ),
            ("project_name", text(&self.project_name)),
            ("project_number", text(&self.project_number)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_from_treatment_level() {
        assert_eq!(ReferenceKind::from_treatment_level("as"), ReferenceKind::Analytic);
        assert_eq!(ReferenceKind::from_treatment_level("amc"), ReferenceKind::Analytic);
        assert_eq!(ReferenceKind::from_treatment_level("s"), ReferenceKind::Source);
        assert_eq!(ReferenceKind::from_treatment_level("mc"), ReferenceKind::Source);
        assert_eq!(ReferenceKind::from_treatment_level(""), ReferenceKind::Source);
    }

    #[test]
    fn test_attachment_extension() {
        let mut attachment = Attachment {
            attachment_file: "2015/03/Report.Final.PDF".to_string(),
            ..Default::default()
        };
        assert_eq!(attachment.extension(), "pdf");

        attachment.attachment_file = "uploads.d/README".to_string();
        assert_eq!(attachment.extension(), "");
    }

    #[test]
    fn test_database_acronyms_skip_blank_lines() {
        let record = LibraryRecord {
            database: Some("LILACS\r\n\n  BBO \nSES-SP".to_string()),
            ..Default::default()
        };
        assert_eq!(record.database_acronyms(), vec!["LILACS", "BBO", "SES-SP"]);
    }

    #[test]
    fn test_analytic_fields_expose_source_link() {
        let analytic = AnalyticRecord {
            reference_id: 7,
            source_id: Some(3),
            title: Some(Json(json!([{"text": "Dengue", "_i": "en"}]))),
            ..Default::default()
        };
        let fields = analytic.fields();
        assert_eq!(fields[0], ("source", json!(3)));
        assert!(fields.contains(&("title", json!([{"text": "Dengue", "_i": "en"}]))));
    }
}
