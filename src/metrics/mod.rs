//
//  bitbucket-metrics
//  metrics/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Prometheus Metrics
//!
//! Gauges fed by collection snapshots and rendered in the Prometheus text
//! format.
//!
//! | Metric | Labels |
//! |--------|--------|
//! | `bitbucket_projects` | |
//! | `bitbucket_repositories` | |
//! | `bitbucket_collect_time` | |
//! | `bitbucket_prs_by_author` | `project`, `repo`, `author` |
//! | `bitbucket_prs_by_reviewer` | `project`, `repo`, `reviewer` |
//! | `bitbucket_branches_by_author` | `project`, `repo`, `author` |
//! | `bitbucket_tags_by_author` | `project`, `repo`, `author` |
//!
//! Label sets are never removed: a person who disappears from a repository
//! keeps their last published value until the process restarts.

pub mod server;

pub use server::{router, serve, serve_on};

use prometheus::{IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};
use tracing::debug;

use crate::collector::{CounterTable, MetricsSink, Snapshot};

const NAMESPACE: &str = "bitbucket";

/// Registry plus every gauge the exporter publishes.
///
/// Cloning is cheap and clones share the same gauges, so one copy can be
/// published to while another is rendered.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    projects: IntGauge,
    repositories: IntGauge,
    collect_time: IntGauge,
    prs_by_author: IntGaugeVec,
    prs_by_reviewer: IntGaugeVec,
    branches_by_author: IntGaugeVec,
    tags_by_author: IntGaugeVec,
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

fn gauge(registry: &Registry, name: &str, help: &str) -> prometheus::Result<IntGauge> {
    let gauge = IntGauge::with_opts(Opts::new(name, help).namespace(NAMESPACE))?;
    registry.register(Box::new(gauge.clone()))?;
    Ok(gauge)
}

fn gauge_vec(
    registry: &Registry,
    name: &str,
    help: &str,
    person_label: &str,
) -> prometheus::Result<IntGaugeVec> {
    let gauge = IntGaugeVec::new(
        Opts::new(name, help).namespace(NAMESPACE),
        &["project", "repo", person_label],
    )?;
    registry.register(Box::new(gauge.clone()))?;
    Ok(gauge)
}

fn to_i64<N: TryInto<i64>>(value: N) -> i64 {
    value.try_into().unwrap_or(i64::MAX)
}

fn set_table(gauges: &IntGaugeVec, table: &CounterTable) {
    for (key, count) in table {
        gauges
            .with_label_values(&[key.project.as_str(), key.repo.as_str(), key.person.as_str()])
            .set(to_i64(*count));
    }
}

impl Metrics {
    /// Creates and registers every gauge on a fresh registry.
    ///
    /// # Errors
    ///
    /// Only if a metric name or label is invalid, which would be a bug.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        Ok(Self {
            projects: gauge(&registry, "projects", "Number of projects")?,
            repositories: gauge(&registry, "repositories", "Number of repositories")?,
            collect_time: gauge(
                &registry,
                "collect_time",
                "Duration of the last collection in milliseconds",
            )?,
            prs_by_author: gauge_vec(
                &registry,
                "prs_by_author",
                "Number of pull requests by author",
                "author",
            )?,
            prs_by_reviewer: gauge_vec(
                &registry,
                "prs_by_reviewer",
                "Number of pull requests by reviewer",
                "reviewer",
            )?,
            branches_by_author: gauge_vec(
                &registry,
                "branches_by_author",
                "Number of branches by author",
                "author",
            )?,
            tags_by_author: gauge_vec(&registry, "tags_by_author", "Number of tags by author", "author")?,
            registry,
        })
    }

    /// Renders every registered metric in the Prometheus text format.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = String::new();
        TextEncoder::new().encode_utf8(&self.registry.gather(), &mut buffer)?;
        Ok(buffer)
    }
}

impl MetricsSink for Metrics {
    fn publish(&self, snapshot: &Snapshot) {
        self.collect_time.set(to_i64(snapshot.elapsed.as_millis()));

        let Some(collection) = &snapshot.collection else {
            debug!("No project data collected, keeping previous values");
            return;
        };

        self.projects.set(to_i64(collection.projects));
        self.repositories.set(to_i64(collection.repositories));
        set_table(&self.prs_by_author, &collection.prs_by_author);
        set_table(&self.prs_by_reviewer, &collection.prs_by_reviewer);
        set_table(&self.branches_by_author, &collection.branches_by_author);
        set_table(&self.tags_by_author, &collection.tags_by_author);
    }
}
