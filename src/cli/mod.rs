//
//  bitbucket-metrics
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Command line and environment options using clap derive macros

use std::fmt;
use std::path::PathBuf;

use clap::builder::NonEmptyStringValueParser;
use clap::Parser;

use crate::auth::Credentials;

/// Bitbucket Metrics - Prometheus exporter for Bitbucket Server/Data Center
#[derive(Parser, Clone)]
#[command(
    name = "bitbucket-metrics",
    version,
    about = "Export Bitbucket Server/Data Center activity as Prometheus metrics",
    long_about = "bitbucket-metrics periodically walks projects, repositories, pull requests\n\
                  and ref changes, and serves per-person counts in the Prometheus text format.",
    after_help = "Every option can also be set through the environment variable shown."
)]
pub struct Cli {
    /// Path of the YAML configuration file
    #[arg(long, short = 'c', env = "CONFIG", default_value = "config.yaml")]
    pub config: PathBuf,

    /// Base URL of the Bitbucket instance, e.g. https://bitbucket.example.com
    #[arg(long, env = "BASE_URL", value_parser = NonEmptyStringValueParser::new())]
    pub base_url: String,

    /// User the exporter authenticates as
    #[arg(long, short = 'u', env = "USERNAME", value_parser = NonEmptyStringValueParser::new())]
    pub username: String,

    /// Password or HTTP access token of that user
    #[arg(
        long,
        short = 'p',
        env = "PASSWORD",
        hide_env_values = true,
        value_parser = NonEmptyStringValueParser::new()
    )]
    pub password: String,
}

impl Cli {
    /// Builds the credentials sent with every request.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.username, &self.password)
    }
}

impl fmt::Debug for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cli")
            .field("config", &self.config)
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
