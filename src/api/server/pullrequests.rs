//
//  bitbucket-metrics
//  api/server/pullrequests.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server/DC Pull Request API
//!
//! Pull requests of a repository, whatever their state.
//!
//! ## API Endpoint
//!
//! ```text
//! GET /rest/api/latest/projects/{projectKey}/repos/{repoSlug}/pull-requests?state=ALL
//! ```
//!
//! ## Record shape
//!
//! Only the fields below are read; everything else is ignored.
//!
//! ```json
//! {
//!     "title": "Add widget",
//!     "state": "MERGED",
//!     "author": {"user": {"slug": "alice"}},
//!     "reviewers": [{"user": {"slug": "bob"}}]
//! }
//! ```

use tracing::debug;

use super::API_PATH;
use crate::api::client::Transport;
use crate::api::common::extract::{all_or_nothing, array_at, str_at};
use crate::api::common::{for_each_record, ApiError, JsonObject};

/// State filter sent with every pull request listing.
pub const STATE_ALL: &str = "ALL";

/// A pull request in Bitbucket Server/Data Center.
///
/// # Fields
///
/// * `title` - Short summary of the change
/// * `state` - State as reported by Bitbucket (`OPEN`, `MERGED`, `DECLINED`, ...)
/// * `author` - Slug of the user who opened the pull request
/// * `reviewers` - Slugs of the assigned reviewers, in the order Bitbucket lists them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// Short summary title.
    pub title: String,

    /// Current state, kept verbatim.
    pub state: String,

    /// Author slug.
    pub author: String,

    /// Reviewer slugs; may be empty.
    pub reviewers: Vec<String>,
}

impl PullRequest {
    /// Decodes a pull request record.
    ///
    /// The reviewers list is all-or-nothing: if `reviewers` is missing, or if
    /// a single entry lacks `user.slug`, the whole pull request is rejected.
    ///
    /// ```rust
    /// use bitbucket_metrics::api::server::PullRequest;
    /// use serde_json::json;
    ///
    /// let record = json!({
    ///     "title": "Add widget",
    ///     "state": "OPEN",
    ///     "author": {"user": {"slug": "alice"}},
    ///     "reviewers": [{"user": {"slug": "bob"}}, {"user": {}}]
    /// });
    /// assert!(PullRequest::from_record(record.as_object().unwrap()).is_none());
    /// ```
    pub fn from_record(record: &JsonObject) -> Option<Self> {
        let reviewers = all_or_nothing(array_at(record, &["reviewers"])?, |reviewer| {
            str_at(reviewer, &["user", "slug"]).map(str::to_string)
        })?;

        Some(Self {
            title: str_at(record, &["title"])?.to_string(),
            state: str_at(record, &["state"])?.to_string(),
            author: str_at(record, &["author", "user", "slug"])?.to_string(),
            reviewers,
        })
    }
}

/// Lists every pull request of a repository, in Bitbucket's order.
///
/// `repo_slug` is the path identifier of the repository (see
/// [`Repository::path_segment`](super::Repository::path_segment)).
///
/// # Errors
///
/// Any transport error aborts the listing; nothing is returned in that case.
pub async fn list_pull_requests<T>(
    transport: &T,
    page_size: u32,
    project_key: &str,
    repo_slug: &str,
) -> Result<Vec<PullRequest>, ApiError>
where
    T: Transport + ?Sized,
{
    let mut pull_requests = Vec::new();

    for_each_record(
        transport,
        &[API_PATH, "projects", project_key, "repos", repo_slug, "pull-requests"],
        &[("state", STATE_ALL)],
        page_size,
        |record| match PullRequest::from_record(&record) {
            Some(pr) => {
                debug!(
                    project = %project_key,
                    repo = %repo_slug,
                    title = %pr.title,
                    state = %pr.state,
                    author = %pr.author,
                    reviewers = ?pr.reviewers,
                    "PR collected"
                );
                pull_requests.push(pr);
            }
            None => debug!(project = %project_key, repo = %repo_slug, "Skipping malformed PR record"),
        },
    )
    .await?;

    Ok(pull_requests)
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::{json, Value};

    use super::*;
    use crate::api::BitbucketClient;
    use crate::auth::Credentials;

    fn decode(value: Value) -> Option<PullRequest> {
        PullRequest::from_record(value.as_object().unwrap())
    }

    #[test]
    fn test_decode_with_reviewers() {
        let pr = decode(json!({
            "id": 7,
            "title": "Fix build",
            "state": "MERGED",
            "author": {"user": {"slug": "alice", "name": "Alice"}, "role": "AUTHOR"},
            "reviewers": [{"user": {"slug": "bob"}}, {"user": {"slug": "carol"}}]
        }))
        .unwrap();

        assert_eq!(pr.author, "alice");
        assert_eq!(pr.state, "MERGED");
        assert_eq!(pr.reviewers, vec!["bob", "carol"]);
    }

    #[test]
    fn test_decode_without_reviewers() {
        let pr = decode(json!({
            "title": "Docs",
            "state": "OPEN",
            "author": {"user": {"slug": "alice"}},
            "reviewers": []
        }))
        .unwrap();
        assert!(pr.reviewers.is_empty());
    }

    #[test]
    fn test_decode_rejects_missing_reviewers_array() {
        assert_eq!(
            decode(json!({"title": "T", "state": "OPEN", "author": {"user": {"slug": "alice"}}})),
            None
        );
    }

    #[test]
    fn test_decode_rejects_any_malformed_reviewer() {
        let malformed = [
            json!("bob"),
            json!({"user": "bob"}),
            json!({"user": {"name": "bob"}}),
            json!({"user": {"slug": 42}}),
        ];

        for reviewer in malformed {
            let record = json!({
                "title": "T",
                "state": "OPEN",
                "author": {"user": {"slug": "alice"}},
                "reviewers": [{"user": {"slug": "bob"}}, reviewer]
            });
            assert_eq!(decode(record), None);
        }
    }

    #[test]
    fn test_decode_rejects_missing_author_slug() {
        assert_eq!(
            decode(json!({"title": "T", "state": "OPEN", "author": {"user": {}}, "reviewers": []})),
            None
        );
    }

    #[tokio::test]
    async fn test_list_pull_requests_sends_state_all() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/latest/projects/P1/repos/r1/pull-requests")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("state".into(), "ALL".into()),
                Matcher::UrlEncoded("start".into(), "0".into()),
                Matcher::UrlEncoded("limit".into(), "50".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "values": [
                        {"title": "A", "state": "OPEN", "author": {"user": {"slug": "alice"}}, "reviewers": []},
                        {"title": "B", "state": "OPEN", "author": {"user": {}}, "reviewers": []}
                    ],
                    "isLastPage": true
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = BitbucketClient::new(&server.url(), Credentials::new("u", "p")).unwrap();
        let prs = list_pull_requests(&client, 50, "P1", "r1").await.unwrap();

        mock.assert_async().await;
        assert_eq!(prs.len(), 1);
        assert_eq!(prs[0].title, "A");
    }
}
