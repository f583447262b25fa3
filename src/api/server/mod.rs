//
//  bitbucket-metrics
//  api/server/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server/Data Center REST API
//!
//! Resource listings consumed by the exporter. Every listing walks an offset
//! paginated endpoint and decodes each record defensively: records missing a
//! required field are skipped, never defaulted.
//!
//! ## Module Organization
//!
//! - [`projects`] - Project listing with an optional allow-list
//! - [`repositories`] - Repositories of a project
//! - [`pullrequests`] - Pull requests of a repository, in every state
//! - [`refchanges`] - Branch and tag creation activity of a repository
//!
//! ## API Endpoints
//!
//! ```text
//! GET /rest/api/latest/application-properties
//! GET /rest/api/latest/projects
//! GET /rest/api/latest/projects/{projectKey}/repos
//! GET /rest/api/latest/projects/{projectKey}/repos/{repoSlug}/pull-requests?state=ALL
//! GET /rest/api/latest/projects/{projectKey}/repos/{repoSlug}/ref-change-activities
//! ```
//!
//! ## Partial results
//!
//! A listing that fails part way through discards the records it already
//! decoded and returns the error, so a branch of the traversal contributes
//! either everything or nothing.

use tracing::debug;

use super::client::Transport;
use super::common::extract::str_at;
use super::common::ApiError;

pub mod projects;
pub mod pullrequests;
pub mod refchanges;
pub mod repositories;

pub use projects::{list_projects, Project};
pub use pullrequests::{list_pull_requests, PullRequest};
pub use refchanges::{list_ref_changes, RefChange, RefChanges, RefKind, UnknownRefKind};
pub use repositories::{list_repositories, Repository};

/// Path prefix of the REST API, relative to the instance base URL.
pub const API_PATH: &str = "rest/api/latest";

/// Fetches the Bitbucket version from `application-properties`.
///
/// Used as a startup check: it proves the base URL and credentials work
/// before any collection cycle runs.
///
/// # Errors
///
/// Any transport error, or [`ApiError::MissingField`] when the response has
/// no `version` string.
///
/// # Example
///
/// ```rust,no_run
/// use bitbucket_metrics::api::server::application_version;
/// use bitbucket_metrics::api::BitbucketClient;
///
/// # async fn example(client: &BitbucketClient) -> Result<(), bitbucket_metrics::api::ApiError> {
/// let version = application_version(client).await?;
/// println!("Bitbucket v{}", version);
/// # Ok(())
/// # }
/// ```
pub async fn application_version<T>(transport: &T) -> Result<String, ApiError>
where
    T: Transport + ?Sized,
{
    let properties = transport
        .get_json(&[API_PATH, "application-properties"], &[])
        .await?;

    match str_at(&properties, &["version"]) {
        Some(version) => Ok(version.to_string()),
        None => {
            debug!(?properties, "Cannot extract Bitbucket version");
            Err(ApiError::MissingField("version"))
        }
    }
}
