//
//  bitbucket-metrics
//  api/common/pagination.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Offset Pagination for Bitbucket Server Responses
//!
//! Bitbucket Server/Data Center pages every listing with `start` and `limit`
//! query parameters. Each page is a JSON object of the form:
//!
//! ```json
//! {
//!     "values": [ ... ],
//!     "size": 25,
//!     "limit": 25,
//!     "start": 0,
//!     "isLastPage": false,
//!     "nextPageStart": 25
//! }
//! ```
//!
//! [`for_each_record`] walks such a listing from `start=0` until the server
//! reports the last page, handing every object in `values` to a callback.
//!
//! # Termination
//!
//! The walk stops when any of the following holds:
//!
//! - `isLastPage` is `true`
//! - `isLastPage` is missing or not a boolean
//! - `nextPageStart` is missing or not a non-negative integer
//! - `nextPageStart` does not move past the current `start`
//!
//! The last three treat malformed metadata as "no more pages" so a broken
//! response can never make the walk spin forever.

use tracing::{debug, warn};

use super::extract::{bool_at, u64_at};
use super::{ApiError, JsonObject};
use crate::api::client::Transport;

/// Query parameter carrying the page size.
pub const LIMIT_PARAM: &str = "limit";

/// Query parameter carrying the zero-based offset of the page.
pub const START_PARAM: &str = "start";

/// One page of a Bitbucket Server listing.
///
/// Built from the raw response document; elements of `values` that are not
/// JSON objects are dropped here so callbacks only ever see objects.
///
/// # Example
///
/// ```rust
/// use bitbucket_metrics::api::common::Page;
/// use serde_json::json;
///
/// let document = json!({
///     "values": [{"key": "PROJ"}, "garbage"],
///     "isLastPage": false,
///     "nextPageStart": 25
/// });
///
/// let page = Page::from_document(document.as_object().unwrap().clone());
/// assert_eq!(page.values.len(), 1);
/// assert_eq!(page.next_start(), Some(25));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Records in the current page.
    pub values: Vec<JsonObject>,

    /// Whether this is the final page. Missing or mistyped metadata counts as `true`.
    pub is_last_page: bool,

    /// Start index for the next page, when the server sent one.
    pub next_page_start: Option<u64>,
}

impl Page {
    /// Splits a response document into its records and continuation metadata.
    pub fn from_document(mut document: JsonObject) -> Self {
        let values = match document.remove("values") {
            Some(serde_json::Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    serde_json::Value::Object(record) => Some(record),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };

        let is_last_page = bool_at(&document, &["isLastPage"]).unwrap_or(true);
        let next_page_start = u64_at(&document, &["nextPageStart"]);

        Self {
            values,
            is_last_page,
            next_page_start,
        }
    }

    /// Returns the `start` value for the next request, if there is one.
    ///
    /// `None` when the page claims to be last, and also when it claims
    /// otherwise but does not say where the next page starts.
    pub fn next_start(&self) -> Option<u64> {
        if self.is_last_page {
            None
        } else {
            self.next_page_start
        }
    }
}

/// Visits every record of a paginated listing.
///
/// Requests `path` with `limit=page_size`, `start=<cursor>` and `params`,
/// invoking `visit` for each JSON object in every page's `values`.
///
/// # Errors
///
/// The first transport error aborts the walk and is returned as is. Records
/// from earlier pages have already been passed to `visit` by then; callers
/// that want all-or-nothing semantics must discard what they gathered.
///
/// # Example
///
/// ```rust,no_run
/// use bitbucket_metrics::api::common::for_each_record;
/// use bitbucket_metrics::api::BitbucketClient;
///
/// # async fn example(client: &BitbucketClient) -> Result<(), bitbucket_metrics::api::ApiError> {
/// let mut keys = Vec::new();
/// for_each_record(client, &["rest/api/latest", "projects"], &[], 100, |record| {
///     if let Some(key) = record.get("key").and_then(|k| k.as_str()) {
///         keys.push(key.to_string());
///     }
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn for_each_record<T, F>(
    transport: &T,
    path: &[&str],
    params: &[(&str, &str)],
    page_size: u32,
    mut visit: F,
) -> Result<(), ApiError>
where
    T: Transport + ?Sized,
    F: FnMut(JsonObject),
{
    let mut start: u64 = 0;

    loop {
        let mut query: Vec<(String, String)> = Vec::with_capacity(params.len() + 2);
        query.push((LIMIT_PARAM.to_string(), page_size.to_string()));
        query.push((START_PARAM.to_string(), start.to_string()));
        query.extend(params.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        let document = transport.get_json(path, &query).await?;
        let page = Page::from_document(document);

        debug!(
            path = %path.join("/"),
            start,
            records = page.values.len(),
            is_last_page = page.is_last_page,
            "Page fetched"
        );

        let next = page.next_start();
        for record in page.values {
            visit(record);
        }

        match next {
            Some(next) if next > start => start = next,
            Some(next) => {
                warn!(
                    path = %path.join("/"),
                    start,
                    next_page_start = next,
                    "nextPageStart does not advance, stopping pagination"
                );
                return Ok(());
            }
            None => return Ok(()),
        }
    }
}
