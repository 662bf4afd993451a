//! fiadmin-api library - bibliographic read service
//!
//! Serves assembled LILACS/ISIS-compatible reference documents and proxies
//! free-text search to the iAHx controller.

use std::sync::Arc;

use axum::Router;
use fiadmin_common::config::ServiceConfig;
use fiadmin_common::FieldTagMap;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod assembler;
pub mod db;
pub mod error;
pub mod pagination;
pub mod search;
pub mod serializer;

use assembler::RecordAssembler;
use error::ApiResult;
use search::SearchClient;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (read-only)
    pub db: SqlitePool,
    /// LILACS defaults with the configured overrides applied
    pub field_tags: Arc<FieldTagMap>,
    pub search: SearchClient,
    pub assembler: RecordAssembler,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, config: ServiceConfig) -> ApiResult<Self> {
        let config = Arc::new(config);
        let field_tags = Arc::new(FieldTagMap::lilacs().with_overrides(&config.field_tags));
        let search = SearchClient::new(&config)?;
        let assembler = RecordAssembler::new(db.clone(), config);

        Ok(Self {
            db,
            field_tags,
            search,
            assembler,
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api::v1_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
