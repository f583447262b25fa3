//
//  bitbucket-metrics
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! Loads the exporter configuration from a YAML file. Every key is optional
//! and falls back to a default; credentials and the instance URL never live
//! here, they come from the command line or environment (see [`crate::cli`]).
//!
//! ## Example Configuration File
//!
//! ```yaml
//! bitbucket:
//!   api_page_size: 100
//!   metrics:
//!     hostname: localhost
//!     port: 8080
//!     path: /metrics
//!     period_in_seconds: 600
//!   projects:
//!     include: [PLAT, WEB]
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bitbucket_metrics::config::Config;
//!
//! let config = Config::load("config.yaml")?;
//! println!("Serving on {}", config.bitbucket.metrics.url());
//! # Ok::<(), bitbucket_metrics::config::ConfigError>(())
//! ```
//!
//! ## Submodules
//!
//! - [`file`]: Low-level configuration file I/O

mod file;

pub use file::*;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of records requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Default interval between collection cycles, in seconds.
pub const DEFAULT_PERIOD_SECONDS: u64 = 600;

/// Errors raised while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Cannot read configuration file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML or does not match the expected structure.
    #[error("Invalid configuration file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A value parsed but is not usable.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Root of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Everything lives under the `bitbucket` key.
    #[serde(default)]
    pub bitbucket: BitbucketConfig,
}

/// Settings for collection and exposition.
///
/// # Fields
///
/// * `api_page_size` - `limit` sent with every paginated request
/// * `metrics` - Where and how often metrics are produced
/// * `projects` - Which projects are traversed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BitbucketConfig {
    pub api_page_size: u32,
    pub metrics: MetricsConfig,
    pub projects: ProjectsConfig,
}

impl Default for BitbucketConfig {
    fn default() -> Self {
        Self {
            api_page_size: DEFAULT_PAGE_SIZE,
            metrics: MetricsConfig::default(),
            projects: ProjectsConfig::default(),
        }
    }
}

/// Metrics endpoint and collection schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Address the metrics server binds to, also used in the logged URL.
    /// `localhost` accepts loopback connections only; use `0.0.0.0` to
    /// accept scrapes from other hosts.
    pub hostname: String,

    /// Port the metrics server listens on.
    pub port: u16,

    /// HTTP path metrics are served under. Must start with `/`.
    pub path: String,

    /// Seconds between the start of two collection cycles.
    pub period_in_seconds: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            port: 8080,
            path: "/metrics".to_string(),
            period_in_seconds: DEFAULT_PERIOD_SECONDS,
        }
    }
}

impl MetricsConfig {
    /// Collection period as a [`Duration`].
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_in_seconds)
    }

    /// URL metrics can be scraped from, for logging.
    ///
    /// ```rust
    /// use bitbucket_metrics::config::MetricsConfig;
    ///
    /// assert_eq!(MetricsConfig::default().url(), "http://localhost:8080/metrics");
    /// ```
    pub fn url(&self) -> String {
        format!("http://{}:{}{}", self.hostname, self.port, self.path)
    }
}

/// Project selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectsConfig {
    /// Project keys to traverse. Absent or empty means every visible project.
    pub include: Option<Vec<String>>,
}

impl ProjectsConfig {
    /// Returns the allow-list, or `None` when every project is included.
    pub fn allow_list(&self) -> Option<&[String]> {
        self.include.as_deref().filter(|keys| !keys.is_empty())
    }
}

impl Config {
    /// Loads and validates the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Read`] if the file is missing or unreadable
    /// - [`ConfigError::Parse`] if it is not valid YAML for this structure
    /// - [`ConfigError::Invalid`] if a value is out of range (see [`Config::validate`])
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = read_config_file(path)?;
        let config: Self = parse_config(path, &content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that parse but cannot work.
    ///
    /// Rejects a zero page size, a zero period, an empty hostname, and a
    /// metrics path that does not start with `/`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bitbucket = &self.bitbucket;

        if bitbucket.api_page_size == 0 {
            return Err(ConfigError::Invalid(
                "bitbucket.api_page_size must be greater than 0".to_string(),
            ));
        }
        if bitbucket.metrics.period_in_seconds == 0 {
            return Err(ConfigError::Invalid(
                "bitbucket.metrics.period_in_seconds must be greater than 0".to_string(),
            ));
        }
        if bitbucket.metrics.hostname.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "bitbucket.metrics.hostname must not be empty".to_string(),
            ));
        }
        if !bitbucket.metrics.path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "bitbucket.metrics.path must start with '/', got '{}'",
                bitbucket.metrics.path
            )));
        }

        Ok(())
    }
}
