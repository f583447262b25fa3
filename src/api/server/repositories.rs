//
//  bitbucket-metrics
//  api/server/repositories.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server/DC Repository API
//!
//! Repositories of a single project.
//!
//! ## API Endpoint
//!
//! ```text
//! GET /rest/api/latest/projects/{projectKey}/repos?limit={pageSize}&start={offset}
//! ```

use std::collections::BTreeMap;

use tracing::debug;

use super::API_PATH;
use crate::api::client::Transport;
use crate::api::common::extract::str_at;
use crate::api::common::{for_each_record, ApiError, JsonObject};

/// A repository in Bitbucket Server/Data Center.
///
/// The name is the only required field and is what metrics are labeled
/// with. The slug, when present, is what request paths are built from.
///
/// # Example
///
/// ```rust
/// use bitbucket_metrics::api::server::Repository;
/// use serde_json::json;
///
/// let record = json!({"name": "My Repo", "slug": "my-repo"});
/// let repo = Repository::from_record(record.as_object().unwrap()).unwrap();
/// assert_eq!(repo.name, "My Repo");
/// assert_eq!(repo.path_segment(), "my-repo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Human-readable repository name.
    pub name: String,

    /// URL-safe identifier used in API paths.
    pub slug: Option<String>,
}

impl Repository {
    /// Decodes a repository record, returning `None` if `name` is missing or not a string.
    pub fn from_record(record: &JsonObject) -> Option<Self> {
        Some(Self {
            name: str_at(record, &["name"])?.to_string(),
            slug: str_at(record, &["slug"]).map(str::to_string),
        })
    }

    /// Returns the identifier to use in request paths: the slug, or the name without one.
    pub fn path_segment(&self) -> &str {
        self.slug.as_deref().unwrap_or(&self.name)
    }
}

/// Lists the repositories of `project_key`, keyed by repository name.
///
/// # Errors
///
/// Any transport error aborts the listing; nothing is returned in that case.
pub async fn list_repositories<T>(
    transport: &T,
    page_size: u32,
    project_key: &str,
) -> Result<BTreeMap<String, Repository>, ApiError>
where
    T: Transport + ?Sized,
{
    let mut repositories = BTreeMap::new();

    for_each_record(
        transport,
        &[API_PATH, "projects", project_key, "repos"],
        &[],
        page_size,
        |record| match Repository::from_record(&record) {
            Some(repo) => {
                repositories.insert(repo.name.clone(), repo);
            }
            None => debug!(project = %project_key, ?record, "Skipping malformed repository record"),
        },
    )
    .await?;

    Ok(repositories)
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;
    use crate::api::BitbucketClient;
    use crate::auth::Credentials;

    #[test]
    fn test_from_record_without_slug() {
        let value = json!({"name": "R1"});
        let repo = Repository::from_record(value.as_object().unwrap()).unwrap();
        assert_eq!(repo.slug, None);
        assert_eq!(repo.path_segment(), "R1");
    }

    #[test]
    fn test_from_record_requires_name() {
        let value = json!({"slug": "r1"});
        assert_eq!(Repository::from_record(value.as_object().unwrap()), None);
    }

    #[tokio::test]
    async fn test_list_repositories_across_pages() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/api/latest/projects/P1/repos")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("limit".into(), "1".into()),
                Matcher::UrlEncoded("start".into(), "0".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({"values": [{"name": "R1", "slug": "r1"}], "isLastPage": false, "nextPageStart": 1})
                    .to_string(),
            )
            .create_async()
            .await;
        server
            .mock("GET", "/rest/api/latest/projects/P1/repos")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("limit".into(), "1".into()),
                Matcher::UrlEncoded("start".into(), "1".into()),
            ]))
            .with_status(200)
            .with_body(json!({"values": [{"name": "R2"}], "isLastPage": true}).to_string())
            .create_async()
            .await;

        let client = BitbucketClient::new(&server.url(), Credentials::new("u", "p")).unwrap();
        let repos = list_repositories(&client, 1, "P1").await.unwrap();

        assert_eq!(repos.len(), 2);
        assert_eq!(repos["R1"].path_segment(), "r1");
        assert_eq!(repos["R2"].path_segment(), "R2");
    }

    #[tokio::test]
    async fn test_list_repositories_discards_partial_results() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/api/latest/projects/P1/repos")
            .match_query(Matcher::UrlEncoded("start".into(), "0".into()))
            .with_status(200)
            .with_body(
                json!({"values": [{"name": "R1"}], "isLastPage": false, "nextPageStart": 1}).to_string(),
            )
            .create_async()
            .await;
        server
            .mock("GET", "/rest/api/latest/projects/P1/repos")
            .match_query(Matcher::UrlEncoded("start".into(), "1".into()))
            .with_status(500)
            .create_async()
            .await;

        let client = BitbucketClient::new(&server.url(), Credentials::new("u", "p")).unwrap();
        let result = list_repositories(&client, 1, "P1").await;
        assert!(matches!(result, Err(ApiError::Status { .. })));
    }
}
