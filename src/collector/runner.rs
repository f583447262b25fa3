//
//  bitbucket-metrics
//  collector/runner.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Periodic Collection
//!
//! Runs a [`Collector`] once at start and then once per period, handing each
//! [`Snapshot`] to a [`MetricsSink`]. Cycles never overlap: a cycle that
//! outlasts the period delays the next tick instead of queueing ticks.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use super::{Collector, Snapshot};
use crate::api::Transport;

/// Destination of collection results.
pub trait MetricsSink: Send + Sync {
    /// Records the outcome of one cycle.
    fn publish(&self, snapshot: &Snapshot);
}

/// Drives a [`Collector`] on a fixed period.
#[derive(Debug)]
pub struct Runner<T, S> {
    collector: Collector<T>,
    sink: S,
    period: Duration,
}

impl<T, S> Runner<T, S>
where
    T: Transport + 'static,
    S: MetricsSink + 'static,
{
    /// Creates a runner publishing every cycle of `collector` to `sink`,
    /// one cycle per `period`.
    pub fn new(collector: Collector<T>, sink: S, period: Duration) -> Self {
        Self {
            collector,
            sink,
            period,
        }
    }

    /// Collects once and publishes the result.
    pub async fn run_once(&self) {
        let snapshot = self.collector.collect().await;
        self.sink.publish(&snapshot);
    }

    /// Collects forever. The first cycle starts immediately.
    pub async fn run(self) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(period_secs = self.period.as_secs(), "Starting periodic collection");
        loop {
            ticker.tick().await;
            self.run_once().await;
            debug!("Waiting for next collection cycle");
        }
    }

    /// Runs [`Runner::run`] on a detached task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
