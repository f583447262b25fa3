//
//  bitbucket-metrics
//  collector/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Collection Cycle
//!
//! Walks projects, their repositories, and every repository's pull requests
//! and ref changes, counting activity per person.
//!
//! ## Traversal
//!
//! ```text
//! projects (allow-list)
//! └── repositories
//!     ├── pull-requests?state=ALL   → prs_by_author, prs_by_reviewer
//!     └── ref-change-activities     → branches_by_author, tags_by_author
//! ```
//!
//! ## Failure policy
//!
//! A cycle never fails. A repository listing error skips its project, a pull
//! request or ref change error skips that part of the repository, and each
//! is logged at `warn`. If the project listing itself fails the snapshot
//! carries no [`Collection`], only the elapsed time.
//!
//! Every cycle starts from empty tables, so running the same cycle twice
//! yields the same counts.

pub mod runner;

pub use runner::{MetricsSink, Runner};

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::api::common::ApiError;
use crate::api::server::{
    list_projects, list_pull_requests, list_ref_changes, list_repositories, Repository,
};
use crate::api::Transport;
use crate::config::BitbucketConfig;

/// Identifies one counter: a person's activity in one repository.
///
/// `repo` is the repository name, not its slug.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AggregationKey {
    /// Project key.
    pub project: String,
    /// Repository name.
    pub repo: String,
    /// Author or reviewer slug, or the pushing user's name for ref changes.
    pub person: String,
}

impl AggregationKey {
    /// Creates a key from its three label values.
    ///
    /// ```rust
    /// use bitbucket_metrics::collector::AggregationKey;
    ///
    /// let key = AggregationKey::new("P1", "R1", "alice");
    /// assert!(key < AggregationKey::new("P1", "R1", "bob"));
    /// ```
    pub fn new(
        project: impl Into<String>,
        repo: impl Into<String>,
        person: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            repo: repo.into(),
            person: person.into(),
        }
    }
}

/// Counts per key, ordered so published label sets are deterministic.
pub type CounterTable = BTreeMap<AggregationKey, u64>;

fn increment(table: &mut CounterTable, key: AggregationKey) {
    *table.entry(key).or_insert(0) += 1;
}

/// Everything one cycle counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    /// Projects that passed the allow-list.
    pub projects: usize,

    /// Repositories across every project whose listing succeeded.
    pub repositories: usize,

    /// Pull requests opened, keyed by author slug.
    pub prs_by_author: CounterTable,

    /// Reviewer assignments, keyed by reviewer slug.
    pub prs_by_reviewer: CounterTable,

    /// Branch ref changes, keyed by user name.
    pub branches_by_author: CounterTable,

    /// Tag ref changes, keyed by user name.
    pub tags_by_author: CounterTable,
}

/// Result of one collection cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// `None` when the project listing failed.
    pub collection: Option<Collection>,

    /// Wall-clock duration of the cycle.
    pub elapsed: Duration,
}

/// Runs collection cycles against a [`Transport`].
///
/// # Example
///
/// ```rust,no_run
/// use bitbucket_metrics::api::BitbucketClient;
/// use bitbucket_metrics::auth::Credentials;
/// use bitbucket_metrics::collector::Collector;
/// use bitbucket_metrics::config::BitbucketConfig;
///
/// # async fn example() -> Result<(), bitbucket_metrics::api::ApiError> {
/// let client = BitbucketClient::new("https://bitbucket.example.com", Credentials::new("u", "p"))?;
/// let collector = Collector::new(client, &BitbucketConfig::default());
///
/// let snapshot = collector.collect().await;
/// if let Some(collection) = snapshot.collection {
///     println!("{} repositories", collection.repositories);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Collector<T> {
    transport: T,
    page_size: u32,
    include: Option<Vec<String>>,
}

impl<T: Transport> Collector<T> {
    /// Creates a collector using the page size and project allow-list of `config`.
    pub fn new(transport: T, config: &BitbucketConfig) -> Self {
        Self {
            transport,
            page_size: config.api_page_size,
            include: config.projects.allow_list().map(<[String]>::to_vec),
        }
    }

    /// Runs one full collection cycle.
    pub async fn collect(&self) -> Snapshot {
        let started = Instant::now();
        info!("Collecting Bitbucket metrics");

        let collection = match self.collect_projects().await {
            Ok(collection) => Some(collection),
            Err(e) => {
                warn!(error = %e, "Cannot list projects");
                None
            }
        };

        let elapsed = started.elapsed();
        match &collection {
            Some(c) => info!(
                projects = c.projects,
                repositories = c.repositories,
                elapsed_ms = elapsed.as_millis() as u64,
                "Collection finished"
            ),
            None => info!(elapsed_ms = elapsed.as_millis() as u64, "Collection finished without projects"),
        }

        Snapshot { collection, elapsed }
    }

    async fn collect_projects(&self) -> Result<Collection, ApiError> {
        let projects = list_projects(&self.transport, self.page_size, self.include.as_deref()).await?;

        let mut collection = Collection {
            projects: projects.len(),
            ..Collection::default()
        };

        for key in projects.keys() {
            let repositories = match list_repositories(&self.transport, self.page_size, key).await {
                Ok(repositories) => repositories,
                Err(e) => {
                    warn!(project = %key, error = %e, "Cannot list repositories, skipping project");
                    continue;
                }
            };

            collection.repositories += repositories.len();
            for repo in repositories.values() {
                self.collect_repository(key, repo, &mut collection).await;
            }
        }

        Ok(collection)
    }

    async fn collect_repository(&self, project: &str, repo: &Repository, collection: &mut Collection) {
        let slug = repo.path_segment();

        match list_pull_requests(&self.transport, self.page_size, project, slug).await {
            Ok(pull_requests) => {
                for pr in pull_requests {
                    increment(
                        &mut collection.prs_by_author,
                        AggregationKey::new(project, &repo.name, pr.author),
                    );
                    for reviewer in pr.reviewers {
                        increment(
                            &mut collection.prs_by_reviewer,
                            AggregationKey::new(project, &repo.name, reviewer),
                        );
                    }
                }
            }
            Err(e) => warn!(project = %project, repo = %repo.name, error = %e, "Cannot list pull requests"),
        }

        match list_ref_changes(&self.transport, self.page_size, project, slug).await {
            Ok(changes) => {
                for change in changes.branches {
                    increment(
                        &mut collection.branches_by_author,
                        AggregationKey::new(project, &repo.name, change.author),
                    );
                }
                for change in changes.tags {
                    increment(
                        &mut collection.tags_by_author,
                        AggregationKey::new(project, &repo.name, change.author),
                    );
                }
            }
            Err(e) => warn!(project = %project, repo = %repo.name, error = %e, "Cannot list ref changes"),
        }
    }
}
