//! Liveness and readiness checks for the three backends

use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;
use voketag_core::{Error, HealthStatus, Result};

use crate::http::join_url;

/// Outcome of checking one endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceHealth {
    pub service: String,
    pub url: String,
    /// `ok`, `ready`, `not_ready`, ... or `unreachable`
    pub status: String,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceHealth {
    #[must_use]
    pub fn is_up(&self) -> bool {
        matches!(self.status.as_str(), "ok" | "ready" | "healthy")
    }
}

/// GET a health endpoint. A 503 still carries a status body (`not_ready`
/// while shutting down), so it decodes like a 200.
pub async fn check(http: &reqwest::Client, url: &str, timeout: Duration) -> Result<HealthStatus> {
    let response = http
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| Error::network(url, e.to_string()))?;
    let status = response.status();
    if !status.is_success() && status != StatusCode::SERVICE_UNAVAILABLE {
        return Err(Error::api(status.as_u16(), format!("health check returned {status}")));
    }
    let body = response
        .bytes()
        .await
        .map_err(|e| Error::network(url, e.to_string()))?;
    Ok(serde_json::from_slice(&body)?)
}

/// Check `url` and never fail; errors become an `unreachable` entry
pub async fn check_service(http: &reqwest::Client, service: &str, url: String, timeout: Duration) -> ServiceHealth {
    let started = Instant::now();
    let result = check(http, &url, timeout).await;
    let latency_ms = started.elapsed().as_millis() as u64;
    match result {
        Ok(health) => ServiceHealth {
            service: service.to_string(),
            url,
            status: health.status,
            latency_ms,
            error: None,
        },
        Err(e) => {
            tracing::debug!(service, error = %e, "health check failed");
            ServiceHealth {
                service: service.to_string(),
                url,
                status: "unreachable".to_string(),
                latency_ms,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Endpoints checked for each backend. The factory base already carries its
/// version prefix, so its health paths hang directly off it.
#[derive(Debug, Clone)]
pub struct HealthTargets {
    pub admin: Url,
    pub factory: Url,
    pub scan: Url,
}

impl HealthTargets {
    #[must_use]
    pub fn urls(&self, include_ready: bool) -> Vec<(&'static str, String)> {
        let mut urls = vec![
            ("admin", join_url(&self.admin, "/v1/health")),
            ("factory", join_url(&self.factory, "/health")),
            ("scan", join_url(&self.scan, "/v1/health")),
        ];
        if include_ready {
            urls.push(("admin-ready", join_url(&self.admin, "/v1/ready")));
            urls.push(("factory-ready", join_url(&self.factory, "/ready")));
        }
        urls
    }

    /// Check every backend concurrently
    pub async fn check_all(&self, http: &reqwest::Client, timeout: Duration, include_ready: bool) -> Vec<ServiceHealth> {
        futures::future::join_all(
            self.urls(include_ready)
                .into_iter()
                .map(|(service, url)| check_service(http, service, url, timeout)),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_paths() {
        let targets = HealthTargets {
            admin: Url::parse("http://127.0.0.1:8082").unwrap(),
            factory: Url::parse("http://localhost:8081/v1").unwrap(),
            scan: Url::parse("http://localhost:8080").unwrap(),
        };
        let urls = targets.urls(true);
        assert_eq!(urls[0].1, "http://127.0.0.1:8082/v1/health");
        assert_eq!(urls[1].1, "http://localhost:8081/v1/health");
        assert_eq!(urls[2].1, "http://localhost:8080/v1/health");
        assert_eq!(urls[3].1, "http://127.0.0.1:8082/v1/ready");
        assert_eq!(targets.urls(false).len(), 3);
    }

    #[test]
    fn test_up_statuses() {
        let mut health = ServiceHealth {
            service: "admin".into(),
            url: String::new(),
            status: "ok".into(),
            latency_ms: 1,
            error: None,
        };
        assert!(health.is_up());
        health.status = "not_ready".into();
        assert!(!health.is_up());
    }
}
