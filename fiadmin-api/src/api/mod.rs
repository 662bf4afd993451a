//! HTTP API handlers for fiadmin-api

pub mod bibliographic;
pub mod health;
pub mod multimedia;

use axum::{routing::get, Router};

use crate::AppState;

pub use health::health_routes;

/// Routes served under `/api/v1`
pub fn v1_routes() -> Router<AppState> {
    Router::new()
        .route("/bibliographic/", get(bibliographic::list_references))
        .route("/bibliographic/search/", get(bibliographic::search))
        .route("/bibliographic/get_last_id/", get(bibliographic::get_last_id))
        .route("/bibliographic/:id/", get(bibliographic::get_reference))
        .route("/multimedia/search/", get(multimedia::search))
}
