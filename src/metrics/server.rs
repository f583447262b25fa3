//
//  bitbucket-metrics
//  metrics/server.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Metrics Endpoint
//!
//! A single `GET` route serving [`Metrics::render`] output.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::Metrics;
use crate::config::MetricsConfig;

async fn render_metrics(State(metrics): State<Metrics>) -> Response {
    match metrics.render() {
        Ok(body) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            error!(error = %e, "Cannot encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Builds the router serving `metrics` under `path`.
pub fn router(metrics: Metrics, path: &str) -> Router {
    Router::new()
        .route(path, get(render_metrics))
        .with_state(metrics)
}

/// Serves `metrics` on an already bound listener until the process exits.
pub async fn serve_on(listener: TcpListener, metrics: Metrics, path: &str) -> std::io::Result<()> {
    axum::serve(listener, router(metrics, path)).await
}

/// Binds `(hostname, port)` from `config` and serves metrics under its path.
///
/// # Errors
///
/// Fails if the address cannot be resolved or bound.
pub async fn serve(metrics: Metrics, config: &MetricsConfig) -> std::io::Result<()> {
    let listener = TcpListener::bind((config.hostname.as_str(), config.port)).await?;
    info!(url = %config.url(), "Serving metrics");
    serve_on(listener, metrics, &config.path).await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::collector::{Collection, MetricsSink, Snapshot};

    async fn spawn_server(metrics: Metrics, path: &'static str) -> String {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { serve_on(listener, metrics, path).await });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let metrics = Metrics::new().unwrap();
        metrics.publish(&Snapshot {
            collection: Some(Collection {
                projects: 3,
                ..Collection::default()
            }),
            elapsed: Duration::from_millis(7),
        });

        let base = spawn_server(metrics, "/metrics").await;
        let response = reqwest::get(format!("{base}/metrics")).await.unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let content_type = response.headers()[reqwest::header::CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/plain"));

        let body = response.text().await.unwrap();
        assert!(body.contains("bitbucket_projects 3"));
        assert!(body.contains("bitbucket_collect_time 7"));
    }

    #[tokio::test]
    async fn test_serve_binds_configured_hostname() {
        let port = {
            let free = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
            free.local_addr().unwrap().port()
        };
        let config = MetricsConfig {
            hostname: "127.0.0.1".to_string(),
            port,
            ..MetricsConfig::default()
        };
        let metrics = Metrics::new().unwrap();
        tokio::spawn(async move { serve(metrics, &config).await });

        let url = format!("http://127.0.0.1:{port}/metrics");
        let mut response = reqwest::get(&url).await;
        for _ in 0..50 {
            if response.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
            response = reqwest::get(&url).await;
        }
        assert_eq!(response.unwrap().status(), reqwest::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_custom_path_only() {
        let base = spawn_server(Metrics::new().unwrap(), "/custom/path").await;

        let ok = reqwest::get(format!("{base}/custom/path")).await.unwrap();
        assert_eq!(ok.status(), reqwest::StatusCode::OK);

        let missing = reqwest::get(format!("{base}/metrics")).await.unwrap();
        assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
    }
}
