//
//  bitbucket-metrics
//  api/server/refchanges.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server/DC Ref Change Activity API
//!
//! Every push that creates, updates or deletes a branch or tag is recorded
//! as a ref change activity. The exporter buckets them by ref type to count
//! branches and tags per person.
//!
//! ## API Endpoint
//!
//! ```text
//! GET /rest/api/latest/projects/{projectKey}/repos/{repoSlug}/ref-change-activities
//! ```
//!
//! ## Record shape
//!
//! ```json
//! {
//!     "user": {"name": "alice"},
//!     "refChange": {"ref": {"displayId": "feature/x", "type": "BRANCH"}}
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, warn};

use super::API_PATH;
use crate::api::client::Transport;
use crate::api::common::extract::str_at;
use crate::api::common::{for_each_record, ApiError, JsonObject};

/// Kind of ref touched by a ref change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    /// A branch (`"BRANCH"`).
    Branch,
    /// A tag (`"TAG"`).
    Tag,
}

impl FromStr for RefKind {
    type Err = ();

    /// Parses the exact, upper-case ref type sent by Bitbucket.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BRANCH" => Ok(Self::Branch),
            "TAG" => Ok(Self::Tag),
            _ => Err(()),
        }
    }
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Branch => write!(f, "BRANCH"),
            Self::Tag => write!(f, "TAG"),
        }
    }
}

/// A ref change whose ref type is neither `BRANCH` nor `TAG`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Reference '{display_id}' by '{author}' has unknown type '{kind}'")]
pub struct UnknownRefKind {
    /// Display name of the ref.
    pub display_id: String,
    /// Name of the user who pushed.
    pub author: String,
    /// The unrecognized type string.
    pub kind: String,
}

/// A decoded ref change activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefChange {
    /// Display name of the ref, e.g. `main` or `v1.0.0`.
    pub display_id: String,
    /// Name of the user who pushed the change.
    pub author: String,
    /// Branch or tag.
    pub kind: RefKind,
}

impl RefChange {
    /// Decodes a ref change activity record.
    ///
    /// Returns `None` when `user.name`, `refChange.ref.displayId` or
    /// `refChange.ref.type` is missing, and `Some(Err(_))` when every field is
    /// present but the type is not one of `BRANCH` or `TAG`.
    ///
    /// ```rust
    /// use bitbucket_metrics::api::server::{RefChange, RefKind};
    /// use serde_json::json;
    ///
    /// let record = json!({
    ///     "user": {"name": "alice"},
    ///     "refChange": {"ref": {"displayId": "v1.0", "type": "TAG"}}
    /// });
    /// let change = RefChange::from_record(record.as_object().unwrap()).unwrap().unwrap();
    /// assert_eq!(change.kind, RefKind::Tag);
    /// ```
    pub fn from_record(record: &JsonObject) -> Option<Result<Self, UnknownRefKind>> {
        let author = str_at(record, &["user", "name"])?;
        let display_id = str_at(record, &["refChange", "ref", "displayId"])?;
        let kind = str_at(record, &["refChange", "ref", "type"])?;

        Some(match kind.parse::<RefKind>() {
            Ok(kind) => Ok(Self {
                display_id: display_id.to_string(),
                author: author.to_string(),
                kind,
            }),
            Err(()) => Err(UnknownRefKind {
                display_id: display_id.to_string(),
                author: author.to_string(),
                kind: kind.to_string(),
            }),
        })
    }
}

/// Ref changes of a repository, split by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefChanges {
    /// Changes to branches.
    pub branches: Vec<RefChange>,
    /// Changes to tags.
    pub tags: Vec<RefChange>,
}

impl RefChanges {
    /// Files a ref change under its kind.
    pub fn push(&mut self, change: RefChange) {
        match change.kind {
            RefKind::Branch => self.branches.push(change),
            RefKind::Tag => self.tags.push(change),
        }
    }
}

/// Lists the ref change activities of a repository, split into branches and tags.
///
/// Records with an unknown ref type are logged at `warn` and skipped; they do
/// not fail the listing.
///
/// # Errors
///
/// Any transport error aborts the listing; nothing is returned in that case.
pub async fn list_ref_changes<T>(
    transport: &T,
    page_size: u32,
    project_key: &str,
    repo_slug: &str,
) -> Result<RefChanges, ApiError>
where
    T: Transport + ?Sized,
{
    let mut changes = RefChanges::default();

    for_each_record(
        transport,
        &[API_PATH, "projects", project_key, "repos", repo_slug, "ref-change-activities"],
        &[],
        page_size,
        |record| match RefChange::from_record(&record) {
            Some(Ok(change)) => {
                debug!(
                    project = %project_key,
                    repo = %repo_slug,
                    reference = %change.display_id,
                    kind = %change.kind,
                    author = %change.author,
                    "Reference collected"
                );
                changes.push(change);
            }
            Some(Err(unknown)) => {
                warn!(
                    project = %project_key,
                    repo = %repo_slug,
                    reference = %unknown.display_id,
                    kind = %unknown.kind,
                    author = %unknown.author,
                    "Reference of unknown type"
                );
            }
            None => debug!(project = %project_key, repo = %repo_slug, "Skipping malformed ref change record"),
        },
    )
    .await?;

    Ok(changes)
}
