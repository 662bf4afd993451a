//! Legacy ISIS field-tag map
//!
//! Maps output field names of the assembled record to the numeric tags of the
//! LILACS/ISIS master file format. Several fields may share a tag; the ISIS
//! serializer then emits all of them as occurrences of that tag.

use std::collections::HashMap;

/// LILACS tags for the fields the record assembler emits
const LILACS_FIELD_TAGS: &[(&str, u32)] = &[
    ("cooperative_center_code", 1),
    ("id", 2),
    ("call_number", 3),
    ("database", 4),
    ("indexed_database", 4),
    ("literature_type", 5),
    ("treatment_level", 6),
    ("electronic_address", 8),
    ("record_type", 9),
    ("individual_author", 10),
    ("corporate_author", 11),
    ("title", 12),
    ("english_translated_title", 13),
    ("pages", 14),
    ("individual_author_monographic", 16),
    ("corporate_author_monographic", 17),
    ("title_monographic", 18),
    ("english_title_monographic", 19),
    ("pages_monographic", 20),
    ("volume_monographic", 21),
    ("individual_author_collection", 23),
    ("corporate_author_collection", 24),
    ("title_collection", 25),
    ("english_title_collection", 26),
    ("total_number_of_volumes", 27),
    ("title_serial", 30),
    ("volume_serial", 31),
    ("issue_number", 32),
    ("issn", 35),
    ("descriptive_information", 38),
    ("text_language", 40),
    ("thesis_dissertation_leader", 49),
    ("thesis_dissertation_institution", 50),
    ("thesis_dissertation_academic_title", 51),
    ("conference_sponsoring_institution", 52),
    ("conference_name", 53),
    ("conference_date", 54),
    ("conference_normalized_date", 55),
    ("conference_city", 56),
    ("conference_country", 57),
    ("project_sponsoring_institution", 58),
    ("project_name", 59),
    ("project_number", 60),
    ("internal_note", 61),
    ("publisher", 62),
    ("edition", 63),
    ("publication_date", 64),
    ("publication_date_normalized", 65),
    ("publication_city", 66),
    ("publication_country", 67),
    ("symbol", 68),
    ("isbn", 69),
    ("total_number_of_references", 72),
    ("abstract", 83),
    ("transfer_date_to_database", 84),
    ("author_keyword", 85),
    ("descriptors_primary", 87),
    ("descriptors_secondary", 88),
    ("created_date", 91),
    ("update_date", 93),
    ("item_form", 110),
    ("general_note", 500),
    ("formatted_contents_note", 505),
    ("additional_physical_form_available_note", 530),
    ("reproduction_note", 533),
    ("original_version_note", 534),
    ("local_descriptors", 653),
    ("clinical_trial_registry_name", 700),
    ("doi", 724),
];

/// Field name → ISIS tag lookup table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTagMap {
    tags: HashMap<String, u32>,
}

impl FieldTagMap {
    /// Default LILACS mapping
    pub fn lilacs() -> Self {
        Self {
            tags: LILACS_FIELD_TAGS
                .iter()
                .map(|(field, tag)| (field.to_string(), *tag))
                .collect(),
        }
    }

    /// Return a copy with `overrides` replacing or extending the mapping.
    /// A tag of 0 removes the field from the map.
    pub fn with_overrides(mut self, overrides: &HashMap<String, u32>) -> Self {
        for (field, tag) in overrides {
            if *tag == 0 {
                self.tags.remove(field);
            } else {
                self.tags.insert(field.clone(), *tag);
            }
        }
        self
    }

    pub fn tag_for(&self, field: &str) -> Option<u32> {
        self.tags.get(field).copied()
    }
}
