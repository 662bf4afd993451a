//! Search passthrough to the iAHx controller
//!
//! Callers may narrow results with their own `fq`, but never past the forced
//! filter: published records of the endpoint's content types only.

use std::time::Duration;

use fiadmin_common::config::ServiceConfig;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ApiResult;

/// Content type filter of the bibliographic search
pub const BIBLIOGRAPHIC_CONTENT_TYPES: &str = "biblioref.reference*";
/// Content type filter of the multimedia search
pub const MULTIMEDIA_CONTENT_TYPES: &str = "multimedia.media";

const USER_AGENT: &str = concat!("fiadmin-api/", env!("CARGO_PKG_VERSION"));

/// Query parameters accepted by the search endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub fq: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub count: String,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default = "default_op")]
    pub op: String,
    #[serde(default)]
    pub id: String,
    #[serde(default = "default_sort")]
    pub sort: String,
}

fn default_lang() -> String {
    "pt".to_string()
}

fn default_op() -> String {
    "search".to_string()
}

fn default_sort() -> String {
    "created_date desc".to_string()
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            q: String::new(),
            fq: String::new(),
            start: String::new(),
            count: String::new(),
            lang: default_lang(),
            op: default_op(),
            id: String::new(),
            sort: default_sort(),
        }
    }
}

/// `(status:1 AND django_ct:<types>)`
pub fn forced_filter(content_types: &str) -> String {
    format!("(status:1 AND django_ct:{})", content_types)
}

/// Forced filter, AND-combined with the caller's `fq` when one was given
pub fn combine_filter(content_types: &str, fq: &str) -> String {
    let forced = forced_filter(content_types);
    if fq.is_empty() {
        forced
    } else {
        format!("{} AND {}", forced, fq)
    }
}

/// HTTP client for the search service
#[derive(Clone)]
pub struct SearchClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl SearchClient {
    pub fn new(config: &ServiceConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(secs) = config.search_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http_client: builder.build()?,
            endpoint: format!("{}iahx-controller/", config.search_service_url),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST the query as a form and return the JSON answer verbatim
    pub async fn search(&self, content_types: &str, query: &SearchQuery) -> ApiResult<Value> {
        let fq = combine_filter(content_types, &query.fq);
        let params = [
            ("site", "fi"),
            ("col", "main"),
            ("op", query.op.as_str()),
            ("output", "site"),
            ("lang", query.lang.as_str()),
            ("q", query.q.as_str()),
            ("fq", fq.as_str()),
            ("start", query.start.as_str()),
            ("count", query.count.as_str()),
            ("id", query.id.as_str()),
            ("sort", query.sort.as_str()),
        ];

        debug!(endpoint = %self.endpoint, q = %query.q, fq = %fq, "Forwarding search");

        let response = self
            .http_client
            .post(&self.endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                warn!("Search service request failed: {}", e);
                e
            })?;

        let status = response.status();
        let body = response.json::<Value>().await.map_err(|e| {
            warn!("Search service returned non-JSON body (HTTP {}): {}", status, e);
            e
        })?;

        Ok(body)
    }
}
