//! Bibliographic record endpoints
//!
//! Detail and collection views serve assembled documents of published
//! references only; `get_last_id` counts every row.

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use chrono::{NaiveDate, NaiveDateTime};
use fiadmin_common::db::{
    count_published_references, get_published_reference, list_published_references,
    max_reference_id, ReferenceFilter,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::pagination::{PageMeta, Paging};
use crate::search::{SearchQuery, BIBLIOGRAPHIC_CONTENT_TYPES};
use crate::serializer::{render_collection, render_document, Format};
use crate::AppState;

const COLLECTION_PATH: &str = "/api/v1/bibliographic/";

/// `?format=` of the record routes
#[derive(Debug, Default, Deserialize)]
pub struct FormatQuery {
    pub format: Option<String>,
}

/// Query parameters of the collection route
#[derive(Debug, Default, Deserialize)]
pub struct CollectionQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub format: Option<String>,
    #[serde(rename = "update_date__gte")]
    pub update_date_gte: Option<String>,
    #[serde(rename = "update_date__lte")]
    pub update_date_lte: Option<String>,
    pub status: Option<String>,
}

/// GET /api/v1/bibliographic/search/
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Value>> {
    let body = state
        .search
        .search(BIBLIOGRAPHIC_CONTENT_TYPES, &query)
        .await?;
    Ok(Json(body))
}

/// GET /api/v1/bibliographic/get_last_id/
///
/// Plain-text highest reference id, unpublished rows included.
pub async fn get_last_id(State(state): State<AppState>) -> ApiResult<String> {
    let last_id = max_reference_id(&state.db).await?;
    Ok(last_id.to_string())
}

/// GET /api/v1/bibliographic/:id/
pub async fn get_reference(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<FormatQuery>,
) -> ApiResult<Response> {
    let format = Format::from_param(query.format.as_deref())?;
    let id: i64 = id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid reference id '{}'", id)))?;

    let reference = get_published_reference(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("reference {}", id)))?;

    let doc = state.assembler.assemble_reference(&reference).await?;
    Ok(render_document(format, &doc, &state.field_tags))
}

/// GET /api/v1/bibliographic/
pub async fn list_references(
    State(state): State<AppState>,
    Query(query): Query<CollectionQuery>,
) -> ApiResult<Response> {
    let format = Format::from_param(query.format.as_deref())?;
    let paging = Paging::from_params(query.limit.as_deref(), query.offset.as_deref())?;
    let filter = parse_filter(&query)?;

    let total_count = count_published_references(&state.db, &filter).await?;
    let references =
        list_published_references(&state.db, &filter, paging.limit, paging.offset).await?;

    let mut objects = Vec::with_capacity(references.len());
    for reference in &references {
        objects.push(state.assembler.assemble_reference(reference).await?);
    }

    debug!(
        total_count,
        limit = paging.limit,
        offset = paging.offset,
        returned = objects.len(),
        "Listed references"
    );

    let mut link_params: Vec<(&str, &str)> = Vec::new();
    if let Some(format) = query.format.as_deref() {
        link_params.push(("format", format));
    }
    if let Some(gte) = query.update_date_gte.as_deref() {
        link_params.push(("update_date__gte", gte));
    }
    if let Some(lte) = query.update_date_lte.as_deref() {
        link_params.push(("update_date__lte", lte));
    }
    if let Some(status) = query.status.as_deref() {
        link_params.push(("status", status));
    }

    let meta = PageMeta::new(paging, total_count, COLLECTION_PATH, &link_params);
    let meta = serde_json::to_value(&meta)
        .map_err(|e| ApiError::Internal(format!("Serialize page meta: {}", e)))?;

    Ok(render_collection(format, &meta, &objects, &state.field_tags))
}

fn parse_filter(query: &CollectionQuery) -> ApiResult<ReferenceFilter> {
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<i64>().map_err(|_| {
            ApiError::BadRequest(format!("Invalid status '{}': expected an integer", raw))
        })?),
    };

    Ok(ReferenceFilter {
        update_date_gte: parse_date_bound("update_date__gte", query.update_date_gte.as_deref())?,
        update_date_lte: parse_date_bound("update_date__lte", query.update_date_lte.as_deref())?,
        status,
    })
}

/// Normalize an ISO date or datetime to the stored `YYYY-MM-DD HH:MM:SS` form
///
/// A bare date means midnight of that day.
pub fn parse_date_bound(name: &str, raw: Option<&str>) -> ApiResult<Option<String>> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };

    const STORED: &str = "%Y-%m-%d %H:%M:%S";

    for pattern in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Ok(Some(datetime.format(STORED).to_string()));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(format!("{} 00:00:00", date.format("%Y-%m-%d"))));
    }

    Err(ApiError::BadRequest(format!(
        "Invalid {} '{}': expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS",
        name, raw
    )))
}
