//
//  bitbucket-metrics
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # HTTP Client Wrapper for Bitbucket Server
//!
//! This module provides the transport used by every listing: a single
//! authenticated request returning a loosely-typed JSON object.
//!
//! ## Features
//!
//! - Basic authentication header on every call
//! - URL building from a base URL, path segments and query parameters
//! - Bitbucket error documents turned into readable error messages
//! - Custom User-Agent header
//!
//! ## Transport trait
//!
//! Pagination and the resource listings only depend on [`Transport`], so they
//! can be driven by something other than a live Bitbucket instance.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::common::{ApiError, JsonObject};
use crate::auth::Credentials;

/// Longest slice of a non-JSON error body kept in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Extracts a readable message from a Bitbucket error response.
///
/// Bitbucket Server returns errors in the format:
/// ```json
/// {"errors": [{"message": "Human readable message"}]}
/// ```
///
/// Falls back to a top level `message` field and then to the raw body,
/// truncated to a few hundred characters.
pub fn format_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        // Server format: {"errors": [{"message": "..."}]}
        if let Some(message) = json
            .get("errors")
            .and_then(|e| e.as_array())
            .and_then(|arr| arr.first())
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return message.to_string();
        }

        // Simple message format: {"message": "..."}
        if let Some(message) = json.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
    }

    let body = body.trim();
    if body.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string();
    }

    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

/// Issues requests against a Bitbucket REST API.
///
/// # Contract
///
/// `execute` joins `path` onto the API base URL (a segment containing `/` is
/// split into several segments), appends `query` in order, and returns the
/// response body when it is a JSON object. Non-success statuses, transport
/// failures and non-object bodies are errors. Nothing is retried.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Executes one request and returns the decoded JSON object.
    async fn execute(
        &self,
        method: Method,
        path: &[&str],
        query: &[(String, String)],
    ) -> Result<JsonObject, ApiError>;

    /// Executes a `GET` request.
    async fn get_json(
        &self,
        path: &[&str],
        query: &[(String, String)],
    ) -> Result<JsonObject, ApiError> {
        self.execute(Method::GET, path, query).await
    }
}

/// The HTTP client for a Bitbucket Server/Data Center instance.
///
/// # Creating a Client
///
/// ```rust,no_run
/// use bitbucket_metrics::api::BitbucketClient;
/// use bitbucket_metrics::auth::Credentials;
///
/// let client = BitbucketClient::new(
///     "https://bitbucket.example.com",
///     Credentials::new("svc-metrics", "secret"),
/// )?;
/// assert_eq!(client.base_url().as_str(), "https://bitbucket.example.com/");
/// # Ok::<(), bitbucket_metrics::api::ApiError>(())
/// ```
#[derive(Debug, Clone)]
pub struct BitbucketClient {
    /// The underlying HTTP client
    http: Client,
    /// Root URL of the Bitbucket instance, without the REST API prefix
    base_url: Url,
    /// Credentials sent with every request
    credentials: Credentials,
    /// Bitbucket version reported by the application properties endpoint
    server_version: Option<String>,
}

impl BitbucketClient {
    /// Creates a new client for the instance at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] when `base_url` cannot be parsed and
    /// [`ApiError::UnsupportedUrl`] when it cannot carry a path (for example
    /// `mailto:` URLs).
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url).map_err(|source| ApiError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::UnsupportedUrl(base_url.to_string()));
        }

        Ok(Self {
            http: Client::builder()
                .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
                .build()?,
            base_url: parsed,
            credentials,
            server_version: None,
        })
    }

    /// Records the Bitbucket version the client talks to.
    pub fn with_server_version(mut self, version: impl Into<String>) -> Self {
        self.server_version = Some(version.into());
        self
    }

    /// Returns the base URL requests are built from.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the Bitbucket version, once recorded.
    pub fn server_version(&self) -> Option<&str> {
        self.server_version.as_deref()
    }

    /// Returns the credentials used by this client.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Builds the full URL for `path` and `query`.
    ///
    /// ```rust
    /// use bitbucket_metrics::api::BitbucketClient;
    /// use bitbucket_metrics::auth::Credentials;
    ///
    /// let client = BitbucketClient::new("https://bb.example.com/", Credentials::new("u", "p")).unwrap();
    /// let url = client
    ///     .url_for(&["rest/api/latest", "projects"], &[("limit".into(), "25".into())])
    ///     .unwrap();
    /// assert_eq!(url.as_str(), "https://bb.example.com/rest/api/latest/projects?limit=25");
    /// ```
    pub fn url_for(&self, path: &[&str], query: &[(String, String)]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ApiError::UnsupportedUrl(self.base_url.to_string()))?;
            segments.pop_if_empty();
            for segment in path
                .iter()
                .flat_map(|p| p.split('/'))
                .filter(|s| !s.is_empty())
            {
                segments.push(segment);
            }
        }

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }

        Ok(url)
    }
}

#[async_trait]
impl Transport for BitbucketClient {
    async fn execute(
        &self,
        method: Method,
        path: &[&str],
        query: &[(String, String)],
    ) -> Result<JsonObject, ApiError> {
        let url = self.url_for(path, query)?;

        let request = self
            .http
            .request(method.clone(), url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header("charset", "UTF-8");
        let request = self.credentials.apply_to_request(request);

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status,
                url: url.to_string(),
                message: format_api_error(status, &text),
            });
        }

        let body = response.bytes().await?;
        let document: Value =
            serde_json::from_slice(&body).map_err(|source| ApiError::InvalidJson {
                url: url.to_string(),
                source,
            })?;

        debug!(%method, %url, status = status.as_u16(), "Request was successfully executed");

        match document {
            Value::Object(object) => Ok(object),
            _ => Err(ApiError::NotAnObject {
                url: url.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use mockito::Matcher;

    use super::*;

    fn client_for(server: &mockito::ServerGuard) -> BitbucketClient {
        BitbucketClient::new(&server.url(), Credentials::new("username", "password")).unwrap()
    }

    #[test]
    fn test_server_version_is_recorded() {
        let client = BitbucketClient::new("https://example.com", Credentials::new("u", "p")).unwrap();
        assert_eq!(client.server_version(), None);

        let client = client.with_server_version("8.9.0");
        assert_eq!(client.server_version(), Some("8.9.0"));
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        let result = BitbucketClient::new("\tinvalid", Credentials::new("u", "p"));
        assert!(matches!(result, Err(ApiError::InvalidUrl { .. })));
    }

    #[test]
    fn test_new_rejects_cannot_be_a_base() {
        let result = BitbucketClient::new("mailto:ops@example.com", Credentials::new("u", "p"));
        assert!(matches!(result, Err(ApiError::UnsupportedUrl(_))));
    }

    #[test]
    fn test_url_for_joins_segments_and_keeps_context_path() {
        let client =
            BitbucketClient::new("https://example.com/bitbucket", Credentials::new("u", "p")).unwrap();
        let url = client
            .url_for(
                &["rest/api/latest", "projects", "PROJ", "repos"],
                &[("start".into(), "0".into()), ("state".into(), "ALL".into())],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/bitbucket/rest/api/latest/projects/PROJ/repos?start=0&state=ALL"
        );
    }

    #[test]
    fn test_url_for_encodes_segments() {
        let client = BitbucketClient::new("https://example.com", Credentials::new("u", "p")).unwrap();
        let url = client.url_for(&["projects", "my repo"], &[]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/projects/my%20repo");
    }

    #[test]
    fn test_format_api_error_server_format() {
        let body = r#"{"errors": [{"message": "Project PROJ does not exist."}]}"#;
        assert_eq!(
            format_api_error(StatusCode::NOT_FOUND, body),
            "Project PROJ does not exist."
        );
    }

    #[test]
    fn test_format_api_error_fallbacks() {
        assert_eq!(
            format_api_error(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down"
        );
        assert_eq!(format_api_error(StatusCode::UNAUTHORIZED, ""), "Unauthorized");

        let long = "x".repeat(MAX_ERROR_BODY + 10);
        let message = format_api_error(StatusCode::INTERNAL_SERVER_ERROR, &long);
        assert_eq!(message.len(), MAX_ERROR_BODY + 3);
    }

    #[tokio::test]
    async fn test_execute_sends_path_query_and_headers() {
        let mut server = mockito::Server::new_async().await;
        let expected_auth = format!("Basic {}", STANDARD.encode("username:password"));
        let mock = server
            .mock("GET", "/1/2/3")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("arg1".into(), "value1".into()),
                Matcher::UrlEncoded("arg2".into(), "value2".into()),
            ]))
            .match_header("authorization", expected_auth.as_str())
            .match_header("content-type", "application/json")
            .match_header("charset", "UTF-8")
            .with_status(200)
            .with_body(r#"{"valid": "true"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let values = client
            .get_json(
                &["1", "2", "3"],
                &[
                    ("arg1".to_string(), "value1".to_string()),
                    ("arg2".to_string(), "value2".to_string()),
                ],
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(values.get("valid").and_then(Value::as_str), Some("true"));
    }

    #[tokio::test]
    async fn test_execute_surfaces_status_and_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/api/latest/projects")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"errors": [{"message": "Authentication failed."}]}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client
            .get_json(&["rest/api/latest", "projects"], &[])
            .await
            .unwrap_err();

        match err {
            ApiError::Status { status, message, .. } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(message, "Authentication failed.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_execute_rejects_invalid_json() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/broken")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("no-valid-JSON")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.get_json(&["broken"], &[]).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidJson { .. }));
    }

    #[tokio::test]
    async fn test_execute_rejects_non_object_json() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/list")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[1, 2, 3]")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.get_json(&["list"], &[]).await.unwrap_err();
        assert!(matches!(err, ApiError::NotAnObject { .. }));
    }
}
