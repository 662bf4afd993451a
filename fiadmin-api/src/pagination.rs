//! Limit/offset paging of the collection endpoint

use serde::Serialize;
use url::form_urlencoded;

use crate::error::ApiError;

/// Page size when the caller sends no `limit`
pub const DEFAULT_LIMIT: i64 = 20;
/// Largest page served; `limit=0` asks for this many
pub const MAX_LIMIT: i64 = 1000;

/// Sanitized paging window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub limit: i64,
    pub offset: i64,
}

impl Paging {
    /// Parse raw `limit`/`offset` parameters
    ///
    /// Non-numeric or negative values are rejected; a limit of 0 or above
    /// [`MAX_LIMIT`] is clamped to [`MAX_LIMIT`].
    pub fn from_params(limit: Option<&str>, offset: Option<&str>) -> Result<Self, ApiError> {
        let limit = match parse_non_negative("limit", limit)? {
            None => DEFAULT_LIMIT,
            Some(0) => MAX_LIMIT,
            Some(n) => n.min(MAX_LIMIT),
        };
        let offset = parse_non_negative("offset", offset)?.unwrap_or(0);

        Ok(Self { limit, offset })
    }
}

fn parse_non_negative(name: &str, raw: Option<&str>) -> Result<Option<i64>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };

    match raw.parse::<i64>() {
        Ok(n) if n >= 0 => Ok(Some(n)),
        _ => Err(ApiError::BadRequest(format!(
            "Invalid {} '{}': expected a non-negative integer",
            name, raw
        ))),
    }
}

/// `meta` block of a collection response
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageMeta {
    pub limit: i64,
    pub offset: i64,
    pub total_count: i64,
    pub previous: Option<String>,
    pub next: Option<String>,
}

impl PageMeta {
    /// Build the meta block; `previous`/`next` link back to `base_path` with
    /// `extra_params` (filters, format) kept.
    pub fn new(
        paging: Paging,
        total_count: i64,
        base_path: &str,
        extra_params: &[(&str, &str)],
    ) -> Self {
        let link = |offset: i64| {
            let mut query = form_urlencoded::Serializer::new(String::new());
            for (key, value) in extra_params {
                query.append_pair(key, value);
            }
            query.append_pair("limit", &paging.limit.to_string());
            query.append_pair("offset", &offset.to_string());
            format!("{}?{}", base_path, query.finish())
        };

        let previous = (paging.offset > 0).then(|| link((paging.offset - paging.limit).max(0)));
        let next_offset = paging.offset.saturating_add(paging.limit);
        let next = (next_offset < total_count).then(|| link(next_offset));

        Self {
            limit: paging.limit,
            offset: paging.offset,
            total_count,
            previous,
            next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = Paging::from_params(None, None).unwrap();
        assert_eq!(p, Paging { limit: 20, offset: 0 });
    }

    #[test]
    fn test_zero_and_oversized_limit_clamped() {
        assert_eq!(Paging::from_params(Some("0"), None).unwrap().limit, MAX_LIMIT);
        assert_eq!(Paging::from_params(Some("5000"), None).unwrap().limit, MAX_LIMIT);
        assert_eq!(Paging::from_params(Some("50"), Some("100")).unwrap().offset, 100);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Paging::from_params(Some("ten"), None).is_err());
        assert!(Paging::from_params(None, Some("-1")).is_err());
    }

    #[test]
    fn test_meta_first_page() {
        let meta = PageMeta::new(
            Paging { limit: 20, offset: 0 },
            45,
            "/api/v1/bibliographic/",
            &[],
        );
        assert_eq!(meta.previous, None);
        assert_eq!(
            meta.next.as_deref(),
            Some("/api/v1/bibliographic/?limit=20&offset=20")
        );
    }

    #[test]
    fn test_meta_last_page_keeps_filters() {
        let meta = PageMeta::new(
            Paging { limit: 20, offset: 30 },
            45,
            "/api/v1/bibliographic/",
            &[("update_date__gte", "2016-01-01 00:00:00")],
        );
        assert_eq!(meta.next, None);
        assert_eq!(
            meta.previous.as_deref(),
            Some("/api/v1/bibliographic/?update_date__gte=2016-01-01+00%3A00%3A00&limit=20&offset=10")
        );
    }

    #[test]
    fn test_meta_offset_at_i64_max() {
        let paging = Paging::from_params(None, Some(&i64::MAX.to_string())).unwrap();
        let meta = PageMeta::new(paging, 45, "/api/v1/bibliographic/", &[]);
        assert_eq!(meta.offset, i64::MAX);
        assert!(meta.next.is_none());
        assert_eq!(
            meta.previous.as_deref(),
            Some(format!("/api/v1/bibliographic/?limit=20&offset={}", i64::MAX - 20).as_str())
        );
    }

    #[test]
    fn test_meta_empty_collection() {
        let meta = PageMeta::new(Paging { limit: 20, offset: 0 }, 0, "/x/", &[]);
        assert_eq!(meta.total_count, 0);
        assert!(meta.previous.is_none());
        assert!(meta.next.is_none());
    }
}
