//! Shared fixtures for fiadmin-api integration tests

#![allow(dead_code)]

use std::collections::HashMap;

use axum::{body::Body, http::Request, Router};
use fiadmin_api::{build_router, db::connect_readonly, AppState};
use fiadmin_common::config::ServiceConfig;
use fiadmin_common::db::*;
use serde_json::{json, Value};
use sqlx::types::Json;
use sqlx::SqlitePool;
use tempfile::TempDir;

pub const SITE_BASE_URL: &str = "http://fi-admin.example.org";
pub const VERSION_MARKER: &str = "LILACS-2.1";

/// Temporary database plus the config pointing at it
pub struct TestEnv {
    pub dir: TempDir,
    pub writer: SqlitePool,
    pub config: ServiceConfig,
}

impl TestEnv {
    pub async fn new(search_service_url: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let database_path = dir.path().join("fiadmin.db");
        let writer = init_database(&database_path).await.unwrap();

        let version_file = dir.path().join("version.txt");
        std::fs::write(&version_file, format!("{}\n", VERSION_MARKER)).unwrap();

        let config = ServiceConfig {
            database_path,
            bind_address: "127.0.0.1:0".to_string(),
            search_service_url: search_service_url.to_string(),
            site_base_url: SITE_BASE_URL.to_string(),
            version_file,
            search_timeout_secs: Some(5),
            log_level: "debug".to_string(),
            field_tags: HashMap::new(),
            config_file: None,
        };

        Self {
            dir,
            writer,
            config,
        }
    }

    /// Router over a read-only connection, as the binary builds it
    pub async fn app(&self) -> Router {
        let pool = connect_readonly(&self.config.database_path).await.unwrap();
        let state = AppState::new(pool, self.config.clone()).unwrap();
        build_router(state)
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_bytes(body: Body) -> Vec<u8> {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body")
        .to_vec()
}

pub async fn extract_json(body: Body) -> Value {
    serde_json::from_slice(&body_bytes(body).await).expect("Should parse JSON")
}

pub async fn extract_text(body: Body) -> String {
    String::from_utf8(body_bytes(body).await).expect("Should be UTF-8")
}

fn base(id: i64, status: i64, treatment_level: &str) -> Reference {
    Reference {
        id,
        status,
        treatment_level: treatment_level.to_string(),
        literature_type: "S".to_string(),
        cooperative_center_code: "BR1.1".to_string(),
        created_date: "2015-03-02 10:00:00".to_string(),
        update_date: "2016-05-10 08:30:00".to_string(),
        ..Default::default()
    }
}

/// Seed the standard fixture set:
/// - 1: published serial Source with every relation populated
/// - 2: published Analytic (article) of Source 1, no relations of its own
/// - 7: unpublished monographic Source
pub async fn seed_catalog(pool: &SqlitePool) {
    let mut serial = base(1, 1, "s");
    serial.publication_date = Some("2015".to_string());
    serial.publication_date_normalized = Some("20150000".to_string());
    serial.electronic_address = Some(Json(json!([
        { "_u": "http://journal.example.org/v49", "_i": "pt", "_y": "TEXT" }
    ])));
    serial.call_number = Some(Json(json!([{ "text": "WA 100" }])));
    save_reference(pool, &serial).await.unwrap();
    save_source(
        pool,
        &SourceRecord {
            reference_id: 1,
            title_serial: Some("Rev Saude Publica".to_string()),
            volume_serial: Some("49".to_string()),
            issn: Some("0034-8910".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    save_descriptor(
        pool,
        &Descriptor {
            object_id: 1,
            content_type: CONTENT_TYPE_SOURCE.to_string(),
            code: Some("D003715".to_string()),
            text: Some("Dengue".to_string()),
            primary: true,
            status: 1,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    save_descriptor(
        pool,
        &Descriptor {
            object_id: 1,
            content_type: CONTENT_TYPE_SOURCE.to_string(),
            code: None,
            text: Some("febre".to_string()),
            primary: false,
            status: 1,
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let area = save_thematic_area(pool, "NT", "Nutrition").await.unwrap();
    link_thematic_area(pool, CONTENT_TYPE_SOURCE, 1, area, 1)
        .await
        .unwrap();

    save_attachment(
        pool,
        &Attachment {
            object_id: 1,
            content_type: CONTENT_TYPE_SOURCE.to_string(),
            attachment_file: "2015/03/fulltext.PDF".to_string(),
            short_url: "Xy12ab".to_string(),
            language: "pt-br".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    save_alternate_id(pool, 1, "lil-741852").await.unwrap();

    let lilacs = save_indexed_database(pool, "LILACS", "LILACS").await.unwrap();
    link_indexed_database(pool, 1, lilacs).await.unwrap();

    save_complement(
        pool,
        &ComplementRecord {
            source_id: 1,
            conference_name: Some("Congresso Brasileiro de Epidemiologia".to_string()),
            conference_city: Some("Vitoria".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    save_library_record(
        pool,
        &LibraryRecord {
            source_id: 1,
            cooperative_center_code: Some("BR99.9".to_string()),
            database: Some("LILACS\n\nBBO\n".to_string()),
            inventory_number: Some("INV-001".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let article = base(2, 1, "as");
    save_reference(pool, &article).await.unwrap();
    save_analytic(
        pool,
        &AnalyticRecord {
            reference_id: 2,
            source_id: Some(1),
            title: Some(Json(json!([{ "text": "Dengue no Brasil", "_i": "pt" }]))),
            individual_author: Some(Json(json!([{ "text": "Silva, Maria", "_1": "USP" }]))),
            pages: Some(Json(json!([{ "_f": "12", "_l": "18" }]))),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let draft = base(7, 0, "m");
    save_reference(pool, &draft).await.unwrap();
    save_source(
        pool,
        &SourceRecord {
            reference_id: 7,
            title_monographic: Some(Json(json!([{ "text": "Manual de vigilancia" }]))),
            ..Default::default()
        },
    )
    .await
    .unwrap();
}
