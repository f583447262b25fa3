//
//  bitbucket-metrics
//  api/server/projects.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server/DC Project API
//!
//! Projects are containers that group related repositories together. They
//! are identified by a short unique key (e.g. `PROJ`, or `~jsmith` for a
//! personal project) that appears in every repository path.
//!
//! ## API Endpoint
//!
//! ```text
//! GET /rest/api/latest/projects?limit={pageSize}&start={offset}
//! ```

use std::collections::BTreeMap;

use tracing::debug;

use super::API_PATH;
use crate::api::client::Transport;
use crate::api::common::extract::str_at;
use crate::api::common::{for_each_record, ApiError, JsonObject};

/// A project in Bitbucket Server/Data Center.
///
/// All three fields are required; a project record lacking any of them,
/// including the description, is skipped.
///
/// # Example
///
/// ```rust
/// use bitbucket_metrics::api::server::Project;
/// use serde_json::json;
///
/// let record = json!({"key": "PROJ", "name": "Project", "description": "Main", "id": 1});
/// let project = Project::from_record(record.as_object().unwrap()).unwrap();
/// assert_eq!(project.key, "PROJ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Short unique key used in URLs and API paths.
    pub key: String,

    /// Human-readable display name.
    pub name: String,

    /// Project description.
    pub description: String,
}

impl Project {
    /// Decodes a project record, returning `None` if any field is missing or not a string.
    pub fn from_record(record: &JsonObject) -> Option<Self> {
        Some(Self {
            key: str_at(record, &["key"])?.to_string(),
            name: str_at(record, &["name"])?.to_string(),
            description: str_at(record, &["description"])?.to_string(),
        })
    }
}

/// Lists every project, keyed by project key.
///
/// When `include` is `Some` and non-empty, only projects whose key appears
/// in it verbatim are kept. `None` or an empty list keeps every project.
///
/// # Errors
///
/// Any transport error aborts the listing; nothing is returned in that case.
pub async fn list_projects<T>(
    transport: &T,
    page_size: u32,
    include: Option<&[String]>,
) -> Result<BTreeMap<String, Project>, ApiError>
where
    T: Transport + ?Sized,
{
    let include = include.filter(|keys| !keys.is_empty());
    let mut projects = BTreeMap::new();

    for_each_record(transport, &[API_PATH, "projects"], &[], page_size, |record| {
        let Some(project) = Project::from_record(&record) else {
            debug!(?record, "Skipping malformed project record");
            return;
        };

        if include.is_some_and(|keys| !keys.contains(&project.key)) {
            return;
        }

        projects.insert(project.key.clone(), project);
    })
    .await?;

    Ok(projects)
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;
    use crate::api::BitbucketClient;
    use crate::auth::Credentials;

    fn record(value: serde_json::Value) -> JsonObject {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_from_record_requires_every_field() {
        let full = record(json!({"key": "P1", "name": "N1", "description": "D1"}));
        assert_eq!(
            Project::from_record(&full),
            Some(Project {
                key: "P1".into(),
                name: "N1".into(),
                description: "D1".into(),
            })
        );

        let no_description = record(json!({"key": "P1", "name": "N1"}));
        assert_eq!(Project::from_record(&no_description), None);

        let numeric_key = record(json!({"key": 1, "name": "N1", "description": "D1"}));
        assert_eq!(Project::from_record(&numeric_key), None);
    }

    async fn serve_projects() -> mockito::ServerGuard {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/api/latest/projects")
            .match_query(Matcher::UrlEncoded("start".into(), "0".into()))
            .with_status(200)
            .with_body(
                json!({
                    "values": [
                        {"key": "P1", "name": "N1", "description": "D1"},
                        {"key": "P2", "name": "N2", "description": "D2"},
                        {"key": "P3", "name": "N3"}
                    ],
                    "isLastPage": true
                })
                .to_string(),
            )
            .create_async()
            .await;
        server
    }

    #[tokio::test]
    async fn test_list_projects_without_filter() {
        let server = serve_projects().await;
        let client = BitbucketClient::new(&server.url(), Credentials::new("u", "p")).unwrap();

        let projects = list_projects(&client, 25, None).await.unwrap();
        assert_eq!(projects.keys().collect::<Vec<_>>(), vec!["P1", "P2"]);

        let projects = list_projects(&client, 25, Some(&[][..])).await.unwrap();
        assert_eq!(projects.len(), 2);
    }

    #[tokio::test]
    async fn test_list_projects_with_allow_list() {
        let server = serve_projects().await;
        let client = BitbucketClient::new(&server.url(), Credentials::new("u", "p")).unwrap();

        let include = vec!["P1".to_string(), "p2".to_string()];
        let projects = list_projects(&client, 25, Some(include.as_slice())).await.unwrap();
        assert_eq!(projects.keys().collect::<Vec<_>>(), vec!["P1"]);
    }
}
