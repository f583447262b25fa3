//
//  bitbucket-metrics
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! The exporter authenticates against Bitbucket Server/Data Center with HTTP
//! Basic authentication using a service account. The identity and secret come
//! from the `USERNAME` and `PASSWORD` environment variables and are never
//! written to logs.

use std::fmt;

use reqwest::RequestBuilder;

/// Basic authentication credentials for Bitbucket Server/Data Center.
///
/// Personal access tokens are accepted in place of the password, Bitbucket
/// Server treats both the same way over Basic authentication.
///
/// # Example
///
/// ```rust
/// use bitbucket_metrics::auth::Credentials;
///
/// let credentials = Credentials::new("svc-metrics", "NjM0NTY3ODkw");
/// assert_eq!(credentials.username(), "svc-metrics");
/// ```
#[derive(Clone)]
pub struct Credentials {
    /// The Bitbucket username of the service account.
    username: String,
    /// The password or personal access token.
    password: String,
}

impl Credentials {
    /// Creates a new set of credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the username these credentials authenticate as.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Applies the credentials to an HTTP request.
    ///
    /// Adds an `Authorization: Basic base64(username:password)` header.
    ///
    /// ```rust,no_run
    /// use bitbucket_metrics::auth::Credentials;
    /// use reqwest::Client;
    ///
    /// let credentials = Credentials::new("svc-metrics", "secret");
    /// let request = credentials.apply_to_request(Client::new().get("https://bitbucket.example.com"));
    /// ```
    pub fn apply_to_request(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.username, Some(&self.password))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
