//
//  bitbucket-metrics
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Metrics Library
//!
//! A Prometheus exporter for Bitbucket Server/Data Center activity.
//!
//! ## Overview
//!
//! The exporter periodically walks every project, repository, pull request and
//! reference change visible to a service account, aggregates the results per
//! person, and exposes them as gauges on an HTTP endpoint.
//!
//! ## Module Structure
//!
//! - [`cli`]: Command-line and environment arguments using clap
//! - [`api`]: HTTP transport, pagination and record decoders for Bitbucket Server/DC
//! - [`auth`]: Basic authentication credentials
//! - [`config`]: YAML configuration file
//! - [`collector`]: Aggregation of a full collection cycle and its scheduler
//! - [`metrics`]: Prometheus gauges and the HTTP endpoint serving them
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use bitbucket_metrics::api::BitbucketClient;
//! use bitbucket_metrics::auth::Credentials;
//! use bitbucket_metrics::collector::Collector;
//! use bitbucket_metrics::Config;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::load("config.yaml")?;
//! let client = BitbucketClient::new(
//!     "https://bitbucket.example.com",
//!     Credentials::new("svc-metrics", "secret"),
//! )?;
//!
//! let collector = Collector::new(client, &config.bitbucket);
//! let snapshot = collector.collect().await;
//! if let Some(collection) = snapshot.collection {
//!     println!("{} projects, {} repositories", collection.projects, collection.repositories);
//! }
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions.
///
/// Every argument can also be supplied through the environment, which is the
/// usual way of running the exporter inside a container.
pub mod cli;

/// API client implementation for Bitbucket Server/Data Center.
///
/// Handles authentication, request building, offset pagination and the
/// defensive decoding of loosely-typed JSON records.
pub mod api;

/// Authentication credentials.
pub mod auth;

/// Configuration file management.
///
/// The exporter reads a single YAML file whose location is given by the
/// `CONFIG` environment variable or the `--config` flag.
pub mod config;

/// Collection cycles.
///
/// Walks projects, repositories, pull requests and reference changes and folds
/// them into per-person counter tables, then republishes them on a schedule.
pub mod collector;

/// Prometheus gauges and HTTP exposition.
pub mod metrics;

/// Re-export of the main CLI struct for convenient access.
pub use cli::Cli;

/// Re-export of the configuration struct.
///
/// # Example
///
/// ```rust,no_run
/// use bitbucket_metrics::Config;
///
/// let config = Config::load("config.yaml").expect("Failed to load config");
/// println!("Page size: {}", config.bitbucket.api_page_size);
/// ```
pub use config::Config;

/// Application name constant.
///
/// Used in the HTTP `User-Agent` header and log output.
pub const APP_NAME: &str = "bitbucket-metrics";

/// Application version constant.
///
/// Derived from Cargo.toml at compile time.
///
/// ```rust
/// use bitbucket_metrics::VERSION;
///
/// println!("bitbucket-metrics version {}", VERSION);
/// ```
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes for the exporter process.
///
/// The exporter only exits on startup failures, so the codes describe which
/// part of the bootstrap failed.
pub mod exit_codes {
    /// Clean shutdown.
    pub const SUCCESS: i32 = 0;

    /// General error.
    ///
    /// The metrics endpoint could not be served or the runtime failed.
    pub const ERROR: i32 = 1;

    /// The configuration file is missing or invalid.
    pub const CONFIG_ERROR: i32 = 3;

    /// Bitbucket rejected the credentials or could not be reached for the
    /// version check.
    pub const AUTH_ERROR: i32 = 4;
}
