//
//  bitbucket-metrics
//  config/file.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration File I/O
//!
//! Reading and parsing of the YAML configuration file. Validation of the
//! parsed values lives in [`Config::validate`](super::Config::validate).

use std::path::Path;

use serde::de::DeserializeOwned;

use super::ConfigError;

/// Reads the contents of a configuration file.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] if the file does not exist, cannot be
/// opened, or is not valid UTF-8.
///
/// # Examples
///
/// ```rust,no_run
/// use std::path::Path;
/// use bitbucket_metrics::config::read_config_file;
///
/// let content = read_config_file(Path::new("config.yaml"))?;
/// println!("Configuration:\n{}", content);
/// # Ok::<(), bitbucket_metrics::config::ConfigError>(())
/// ```
pub fn read_config_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses YAML content into `T`.
///
/// An empty document parses as if every key were missing, so `T` must be
/// fully defaultable for an empty file to be accepted.
pub fn parse_config<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T, ConfigError> {
    let content = if content.trim().is_empty() { "{}" } else { content };

    serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
