//! Output formats of the record endpoints
//!
//! - `json`: the document as is
//! - `xml`: `<response>` with one element per field; mapped fields carry their
//!   ISIS tag in a `tag` attribute
//! - `isis_id`: CISIS ID text, `!ID nnnnnnn` followed by one `!vNNN!value`
//!   line per occurrence; unmapped fields are left out

use std::fmt::Write as _;

use axum::{
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use fiadmin_common::FieldTagMap;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Requested output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Json,
    Xml,
    IsisId,
}

impl Format {
    /// Parse the `format` query parameter; absent means JSON
    pub fn from_param(param: Option<&str>) -> Result<Self, ApiError> {
        match param.map(str::trim) {
            None | Some("") | Some("json") => Ok(Format::Json),
            Some("xml") => Ok(Format::Xml),
            Some("isis_id") => Ok(Format::IsisId),
            Some(other) => Err(ApiError::BadRequest(format!(
                "Unsupported format '{}', expected json, xml or isis_id",
                other
            ))),
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::Xml => "application/xml; charset=utf-8",
            Format::IsisId => "text/plain; charset=utf-8",
        }
    }
}

/// Render a single assembled document
pub fn render_document(format: Format, doc: &Map<String, Value>, tags: &FieldTagMap) -> Response {
    match format {
        Format::Json => Json(Value::Object(doc.clone())).into_response(),
        Format::Xml => text_response(format, to_xml(doc, tags)),
        Format::IsisId => text_response(format, to_isis_id(doc, tags)),
    }
}

/// Render a collection page
///
/// ISIS output has no room for paging metadata, so `meta` only appears in the
/// JSON and XML forms.
pub fn render_collection(
    format: Format,
    meta: &Value,
    objects: &[Map<String, Value>],
    tags: &FieldTagMap,
) -> Response {
    match format {
        Format::Json => {
            let objects: Vec<Value> = objects.iter().cloned().map(Value::Object).collect();
            Json(serde_json::json!({ "meta": meta, "objects": objects })).into_response()
        }
        Format::Xml => {
            let mut out = String::from(XML_DECLARATION);
            out.push_str("<response>");
            write_xml_element(&mut out, "meta", meta, None);
            out.push_str("<objects type=\"list\">");
            for doc in objects {
                out.push_str("<object type=\"hash\">");
                write_xml_fields(&mut out, doc, tags);
                out.push_str("</object>");
            }
            out.push_str("</objects></response>");
            text_response(format, out)
        }
        Format::IsisId => {
            let out: String = objects.iter().map(|doc| to_isis_id(doc, tags)).collect();
            text_response(format, out)
        }
    }
}

fn text_response(format: Format, body: String) -> Response {
    ([(header::CONTENT_TYPE, format.content_type())], body).into_response()
}

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

/// XML form of one document
pub fn to_xml(doc: &Map<String, Value>, tags: &FieldTagMap) -> String {
    let mut out = String::from(XML_DECLARATION);
    out.push_str("<response>");
    write_xml_fields(&mut out, doc, tags);
    out.push_str("</response>");
    out
}

fn write_xml_fields(out: &mut String, doc: &Map<String, Value>, tags: &FieldTagMap) {
    for (name, value) in doc {
        write_xml_element(out, name, value, tags.tag_for(name));
    }
}

fn write_xml_element(out: &mut String, name: &str, value: &Value, tag: Option<u32>) {
    let name = xml_name(name);
    out.push('<');
    out.push_str(&name);
    if let Some(tag) = tag {
        let _ = write!(out, " tag=\"{}\"", tag);
    }

    match value {
        Value::Null => {
            out.push_str(" type=\"null\"/>");
            return;
        }
        Value::Bool(b) => {
            let _ = write!(out, " type=\"boolean\">{}", b);
        }
        Value::Number(n) => {
            let kind = if n.is_f64() { "float" } else { "integer" };
            let _ = write!(out, " type=\"{}\">{}", kind, n);
        }
        Value::String(s) => {
            out.push('>');
            out.push_str(&escape_xml(s));
        }
        Value::Array(items) => {
            out.push_str(" type=\"list\">");
            for item in items {
                let child = if item.is_object() { "object" } else { "value" };
                write_xml_element(out, child, item, None);
            }
        }
        Value::Object(map) => {
            out.push_str(" type=\"hash\">");
            for (key, child) in map {
                write_xml_element(out, key, child, None);
            }
        }
    }

    let _ = write!(out, "</{}>", name);
}

/// Element names may not start with a digit or contain spaces
fn xml_name(name: &str) -> String {
    let mut cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned
        .chars()
        .next()
        .map_or(true, |c| c.is_ascii_digit() || c == '-' || c == '.')
    {
        cleaned.insert(0, '_');
    }
    cleaned
}

pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// CISIS ID form of one document
pub fn to_isis_id(doc: &Map<String, Value>, tags: &FieldTagMap) -> String {
    let mfn = doc
        .get("MFN")
        .or_else(|| doc.get("id"))
        .and_then(Value::as_i64)
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(out, "!ID {:07}", mfn);

    for (name, value) in doc {
        let Some(tag) = tags.tag_for(name) else {
            continue;
        };
        for occurrence in isis_occurrences(value) {
            let _ = writeln!(out, "!v{:03}!{}", tag, occurrence);
        }
    }

    out
}

/// One rendered string per occurrence; empty occurrences are dropped
fn isis_occurrences(value: &Value) -> Vec<String> {
    let rendered: Vec<String> = match value {
        Value::Array(items) => items.iter().flat_map(isis_occurrences).collect(),
        other => vec![isis_scalar(other)],
    };
    rendered
        .into_iter()
        .filter(|occurrence| !occurrence.is_empty())
        .collect()
}

fn isis_scalar(value: &Value) -> String {
    let text = match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) => String::new(),
        Value::Object(map) => isis_subfields(map),
    };
    single_line(&text)
}

/// `text^avalue^bvalue`: main text first, `_x` keys as `^x` subfields
fn isis_subfields(map: &Map<String, Value>) -> String {
    let mut out = map
        .get("text")
        .map(isis_scalar)
        .unwrap_or_default();

    for (key, value) in map {
        let Some(code) = key.strip_prefix('_') else {
            continue;
        };
        let value = isis_scalar(value);
        if code.is_empty() || value.is_empty() {
            continue;
        }
        let _ = write!(out, "^{}{}", code, value);
    }

    out
}

fn single_line(text: &str) -> String {
    text.split(|c| c == '\r' || c == '\n')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_doc() -> Map<String, Value> {
        match json!({
            "id": 12,
            "MFN": 12,
            "title": [{ "text": "Dengue & Zika", "_i": "pt" }],
            "descriptors_primary": [{ "text": "D003715" }, { "text": "[febre]" }],
            "electronic_address": [{ "_u": "http://site/document/view/x", "_i": "pt", "_y": "PDF", "_q": "pdf" }],
            "general_note": "line one\nline two",
            "resource_uri": "/api/v1/bibliographic/12/",
            "doi": null
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_format_from_param() {
        assert_eq!(Format::from_param(None).unwrap(), Format::Json);
        assert_eq!(Format::from_param(Some("xml")).unwrap(), Format::Xml);
        assert_eq!(Format::from_param(Some("isis_id")).unwrap(), Format::IsisId);
        assert!(Format::from_param(Some("csv")).is_err());
    }

    #[test]
    fn test_isis_id_output() {
        let out = to_isis_id(&sample_doc(), &FieldTagMap::lilacs());
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "!ID 0000012");
        assert!(lines.contains(&"!v002!12"));
        assert!(lines.contains(&"!v012!Dengue & Zika^ipt"));
        assert!(lines.contains(&"!v087!D003715"));
        assert!(lines.contains(&"!v087![febre]"));
        assert!(lines.contains(&"!v008!^uhttp://site/document/view/x^ipt^yPDF^qpdf"));
        assert!(lines.contains(&"!v500!line one line two"));
        // Unmapped and empty fields are skipped
        assert!(!out.contains("resource_uri"));
        assert!(!out.contains("!v724!"));
    }

    #[test]
    fn test_xml_output_carries_tags_and_escapes() {
        let out = to_xml(&sample_doc(), &FieldTagMap::lilacs());

        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(out.contains("<id tag=\"2\" type=\"integer\">12</id>"));
        assert!(out.contains("<MFN type=\"integer\">12</MFN>"));
        assert!(out.contains("<text>Dengue &amp; Zika</text>"));
        assert!(out.contains("<title tag=\"12\" type=\"list\"><object type=\"hash\">"));
        assert!(out.contains("<doi tag=\"724\" type=\"null\"/>"));
        assert!(out.ends_with("</response>"));
    }

    #[test]
    fn test_xml_name_sanitizing() {
        assert_eq!(xml_name("title_serial"), "title_serial");
        assert_eq!(xml_name("8"), "_8");
        assert_eq!(xml_name("a b"), "a_b");
    }
}
