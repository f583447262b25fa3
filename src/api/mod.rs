//
//  bitbucket-metrics
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! HTTP access to the Bitbucket Server/Data Center REST API.
//!
//! ## Architecture
//!
//! - [`client`]: Authenticated transport returning loosely-typed JSON objects
//! - [`common`]: Errors, fail-closed field extraction and offset pagination
//! - [`server`]: Resource listings and their record decoders
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bitbucket_metrics::api::server::{application_version, list_projects};
//! use bitbucket_metrics::api::BitbucketClient;
//! use bitbucket_metrics::auth::Credentials;
//!
//! # async fn example() -> Result<(), bitbucket_metrics::api::ApiError> {
//! let client = BitbucketClient::new(
//!     "https://bitbucket.example.com",
//!     Credentials::new("svc-metrics", "secret"),
//! )?;
//!
//! let version = application_version(&client).await?;
//! let projects = list_projects(&client, 100, None).await?;
//! println!("Bitbucket v{} has {} projects", version, projects.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every failure is an [`ApiError`]. Nothing in this layer retries; callers
//! decide how much of a traversal a failure invalidates.

/// Authenticated HTTP transport.
///
/// Provides [`BitbucketClient`] and the [`client::Transport`] trait the rest
/// of the layer is written against.
pub mod client;

/// Bitbucket Server/Data Center resource listings.
///
/// - [`server::projects`]: Projects, with an optional allow-list
/// - [`server::repositories`]: Repositories of a project
/// - [`server::pullrequests`]: Pull requests of a repository
/// - [`server::refchanges`]: Branch and tag activity of a repository
pub mod server;

/// Types shared across listings.
///
/// Includes:
/// - [`ApiError`]: Error type for API operations
/// - [`common::Page`] and [`common::for_each_record`]: offset pagination
/// - [`common::extract`]: fail-closed JSON field extraction
pub mod common;

/// Re-export of the Bitbucket API client.
pub use client::{BitbucketClient, Transport};

/// Re-export of the API error type.
pub use common::ApiError;
