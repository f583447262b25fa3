//
//  bitbucket-metrics
//  main.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bitbucket_metrics::api::server::application_version;
use bitbucket_metrics::api::BitbucketClient;
use bitbucket_metrics::collector::{Collector, Runner};
use bitbucket_metrics::metrics::{self, Metrics};
use bitbucket_metrics::{exit_codes, Cli, Config};

#[tokio::main]
async fn main() {
    // Initialize logging
    init_logging();

    // Parse CLI arguments and environment
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config)
        .with_context(|| format!("Cannot load configuration from {}", cli.config.display()))
    {
        Ok(config) => config,
        Err(e) => exit(exit_codes::CONFIG_ERROR, e),
    };
    info!(path = %cli.config.display(), "Configuration loaded");

    // Reach Bitbucket once before scheduling anything
    let client = match connect(&cli).await {
        Ok(client) => client,
        Err(e) => exit(exit_codes::AUTH_ERROR, e),
    };

    match run(client, config).await {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => exit(exit_codes::ERROR, e),
    }
}

/// Initialize logging based on environment
fn init_logging() {
    let directive = log_directive(std::env::var("LOG_LEVEL").ok().as_deref());
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

const DEFAULT_LOG_LEVEL: &str = "info";

/// Turns `LOG_LEVEL` into an `EnvFilter` directive.
///
/// A bare level is matched case-insensitively and accepts `warning`, `fatal`
/// and `panic` as aliases. Anything containing `=` or `,` is passed through
/// as a full directive. Unknown bare words fall back to `info`.
fn log_directive(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return DEFAULT_LOG_LEVEL.to_string();
    };
    if raw.contains('=') || raw.contains(',') {
        return raw.to_string();
    }

    match raw.to_ascii_lowercase().as_str() {
        level @ ("trace" | "debug" | "info" | "warn" | "error" | "off") => level.to_string(),
        "warning" => "warn".to_string(),
        "fatal" | "panic" => "error".to_string(),
        _ => DEFAULT_LOG_LEVEL.to_string(),
    }
}

fn exit(code: i32, error: anyhow::Error) -> ! {
    eprintln!("Error: {error:#}");
    std::process::exit(code);
}

/// Builds the client and fetches the Bitbucket version.
async fn connect(cli: &Cli) -> Result<BitbucketClient> {
    let client = BitbucketClient::new(&cli.base_url, cli.credentials())?;

    let version = application_version(&client)
        .await
        .with_context(|| format!("Cannot reach Bitbucket at {}", client.base_url()))?;
    Ok(client.with_server_version(version))
}

/// Starts periodic collection and serves metrics until the process exits.
async fn run(client: BitbucketClient, config: Config) -> Result<()> {
    let metrics = Metrics::new().context("Cannot register metrics")?;

    info!(
        url = %client.base_url(),
        version = client.server_version().unwrap_or("unknown"),
        "Connected to Bitbucket"
    );

    let collector = Collector::new(client, &config.bitbucket);
    Runner::new(collector, metrics.clone(), config.bitbucket.metrics.period()).spawn();

    metrics::serve(metrics, &config.bitbucket.metrics)
        .await
        .with_context(|| format!("Cannot serve metrics on {}", config.bitbucket.metrics.url()))
}
