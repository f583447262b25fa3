//
//  bitbucket-metrics
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Common API Types for Bitbucket Server
//!
//! This module provides the shared building blocks used by every resource
//! listing: the error type, the loosely-typed JSON document alias, the
//! extraction helpers used by the record decoders, and offset pagination.
//!
//! # Overview
//!
//! - [`ApiError`] - Error type for transport and response failures
//! - [`JsonObject`] - A decoded JSON object as returned by the transport
//! - [`extract`] - Fail-closed field extraction from untyped JSON
//! - Pagination (re-exported from the `pagination` submodule)
//!
//! # Example
//!
//! ```rust
//! use bitbucket_metrics::api::common::ApiError;
//!
//! fn describe(result: Result<(), ApiError>) -> String {
//!     match result {
//!         Ok(()) => "ok".to_string(),
//!         Err(ApiError::Status { status, .. }) => format!("HTTP {}", status),
//!         Err(e) => e.to_string(),
//!     }
//! }
//! ```

use reqwest::StatusCode;
use thiserror::Error;

pub mod extract;
mod pagination;

pub use pagination::*;

/// A JSON object as decoded from a Bitbucket response body.
///
/// Responses are kept loosely typed so that a single malformed record never
/// fails a whole page; the decoders in [`crate::api::server`] pick the fields
/// they need and skip records that do not have them.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Error type for all Bitbucket API operations.
///
/// # Variants
///
/// | Variant | Description |
/// |---------|-------------|
/// | `InvalidUrl` | The configured base URL cannot be parsed |
/// | `UnsupportedUrl` | The base URL cannot carry path segments (e.g. `mailto:`) |
/// | `Network` | Connection, TLS, or body read failure |
/// | `Status` | Bitbucket answered with a non-success status |
/// | `InvalidJson` | The body is not valid JSON |
/// | `NotAnObject` | The body is valid JSON but not an object |
/// | `MissingField` | A required field is absent from a response |
///
/// # Notes
///
/// - The `Network` variant converts automatically from `reqwest::Error`
/// - None of these errors are retried; see [`crate::collector`] for how they
///   are contained
#[derive(Error, Debug)]
pub enum ApiError {
    /// The base URL could not be parsed.
    #[error("Invalid base URL '{url}': {source}")]
    InvalidUrl {
        /// The URL as supplied by the operator.
        url: String,
        /// The parser error.
        #[source]
        source: url::ParseError,
    },

    /// The base URL cannot have path segments appended to it.
    #[error("Base URL '{0}' cannot be used as an API root")]
    UnsupportedUrl(String),

    /// A network-level error occurred during the request.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Bitbucket answered with a non-success status code.
    ///
    /// The message is extracted from the Bitbucket error document when the
    /// body has one, otherwise it is the raw (truncated) body.
    #[error("HTTP {status} from {url}: {message}")]
    Status {
        /// The response status.
        status: StatusCode,
        /// The requested URL.
        url: String,
        /// Error message reported by Bitbucket.
        message: String,
    },

    /// The response body is not valid JSON.
    #[error("Cannot parse JSON body from {url}: {source}")]
    InvalidJson {
        /// The requested URL.
        url: String,
        /// The parser error.
        #[source]
        source: serde_json::Error,
    },

    /// The response body is JSON, but not an object.
    #[error("Response from {url} is not a JSON object")]
    NotAnObject {
        /// The requested URL.
        url: String,
    },

    /// A field required by the caller is missing from a response.
    #[error("Field '{0}' missing from response")]
    MissingField(&'static str),
}
