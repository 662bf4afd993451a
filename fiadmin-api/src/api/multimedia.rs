//! Multimedia search passthrough

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::Value;

use crate::error::ApiResult;
use crate::search::{SearchQuery, MULTIMEDIA_CONTENT_TYPES};
use crate::AppState;

/// GET /api/v1/multimedia/search/
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Value>> {
    let body = state.search.search(MULTIMEDIA_CONTENT_TYPES, &query).await?;
    Ok(Json(body))
}
