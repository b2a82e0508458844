//! HTTP Backend Client
//!
//! Reqwest-based client for the orchestration backend. Wire shapes follow
//! the execution endpoints: a creation call returns `{id, status}` and a
//! status call returns a current snapshot of the same shape.
//!
//! Every request passes through the endpoint's circuit breaker; a blocked
//! request surfaces as an `Unavailable` fetch error so poll loops treat it
//! like any other transient failure.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::circuit_breaker::CircuitBreaker;
use super::JobBackend;
use crate::config::{BackendConfig, BreakerSettings};
use crate::types::{ErrorCategory, ErrorClassifier, FetchError, JobId, JobKind, JobSnapshot};
use crate::types::{Result, WatchError};

/// HTTP client for the orchestration backend
pub struct HttpBackend {
    base: String,
    client: reqwest::Client,
    token: Option<SecretString>,
    breaker: CircuitBreaker,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig, breaker_settings: BreakerSettings) -> Result<Self> {
        let base = Self::validate_endpoint(&config.endpoint)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| WatchError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let breaker = CircuitBreaker::new(base.clone(), breaker_settings);

        Ok(Self {
            base,
            token: config.api_token.as_deref().map(SecretString::from),
            client,
            breaker,
        })
    }

    /// Validate endpoint URL for security (SSRF prevention)
    ///
    /// Only allows http/https schemes and warns for non-localhost endpoints.
    fn validate_endpoint(endpoint: &str) -> Result<String> {
        let url = url::Url::parse(endpoint).map_err(|e| {
            WatchError::Config(format!("Invalid backend endpoint URL '{}': {}", endpoint, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(WatchError::Config(format!(
                "Backend endpoint must use http or https scheme, got: {}",
                url.scheme()
            )));
        }

        if let Some(host) = url.host_str()
            && !matches!(host, "localhost" | "127.0.0.1" | "::1")
        {
            warn!(
                "Backend endpoint is not localhost: {}. Ensure this is intentional.",
                host
            );
        }

        // Remove trailing slash for consistency
        let mut result = url.to_string();
        if result.ends_with('/') {
            result.pop();
        }
        Ok(result)
    }

    /// Circuit breaker statistics for this endpoint
    pub fn breaker_stats(&self) -> super::circuit_breaker::CircuitBreakerStats {
        self.breaker.stats()
    }

    fn guard(&self) -> Result<()> {
        if self.breaker.allow_request() {
            Ok(())
        } else {
            Err(FetchError::new(
                ErrorCategory::Unavailable,
                "Circuit breaker is open; backend requests suspended",
            )
            .endpoint(&self.base)
            .into())
        }
    }

    fn attach_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token.expose_secret()),
            None => req,
        }
    }

    /// Send a request and decode a job snapshot, recording the outcome in
    /// the circuit breaker. Only backend-side failures (transport errors
    /// and 5xx/429 responses) count against the breaker.
    async fn send_snapshot_request(&self, req: reqwest::RequestBuilder) -> Result<JobSnapshot> {
        let response = match self.attach_auth(req).send().await {
            Ok(resp) => resp,
            Err(e) => {
                self.breaker.record_failure();
                return Err(ErrorClassifier::classify_transport(&e, &self.base).into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let code = status.as_u16();
            if matches!(code, 429 | 500..=599) {
                self.breaker.record_failure();
            }
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::classify_http_status(code, &body, &self.base).into());
        }

        self.breaker.record_success();

        let snapshot: JobSnapshot = response.json().await.map_err(|e| {
            FetchError::new(
                ErrorCategory::ParseError,
                format!("Failed to parse backend response: {}", e),
            )
            .endpoint(&self.base)
        })?;

        Ok(snapshot)
    }
}

#[async_trait]
impl JobBackend for HttpBackend {
    async fn submit(&self, kind: JobKind, params: Value) -> Result<JobSnapshot> {
        self.guard()?;

        info!(kind = %kind, "Submitting job");
        let url = format!("{}/api/executions", self.base);
        let request = SubmitRequest { kind, params };

        debug!(url = %url, "Sending create request");
        let snapshot = self
            .send_snapshot_request(self.client.post(&url).json(&request))
            .await?;

        // A snapshot without an addressable id cannot be polled
        if !snapshot.id.is_valid() {
            return Err(WatchError::EmptyJobId);
        }

        info!(job_id = %snapshot.id, status = %snapshot.status, "Job accepted");
        Ok(snapshot)
    }

    async fn fetch_status(&self, id: &JobId) -> Result<JobSnapshot> {
        self.guard()?;

        let url = format!("{}/api/executions/{}", self.base, id);
        debug!(job_id = %id, "Fetching job status");

        self.send_snapshot_request(self.client.get(&url)).await
    }

    async fn stop(&self, id: &JobId) -> Result<JobSnapshot> {
        self.guard()?;

        let url = format!("{}/api/executions/{}/stop", self.base, id);
        info!(job_id = %id, "Requesting job stop");

        self.send_snapshot_request(self.client.post(&url)).await
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/health", self.base);

        match self.attach_auth(self.client.get(&url)).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("Backend is available at {}", self.base);
                Ok(true)
            }
            Ok(resp) => {
                warn!("Backend health check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Backend not reachable: {}", e);
                Ok(false)
            }
        }
    }

    fn name(&self) -> &str {
        &self.base
    }
}

// Request types

#[derive(Debug, Serialize)]
struct SubmitRequest {
    kind: JobKind,
    params: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(endpoint: &str) -> Result<HttpBackend> {
        let config = BackendConfig {
            endpoint: endpoint.to_string(),
            ..Default::default()
        };
        HttpBackend::new(&config, BreakerSettings::default())
    }

    #[test]
    fn test_default_endpoint_accepted() {
        let b = backend("http://localhost:8000").unwrap();
        assert_eq!(b.base, "http://localhost:8000");
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let b = backend("http://localhost:8000/").unwrap();
        assert_eq!(b.base, "http://localhost:8000");
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        assert!(backend("ftp://localhost:8000").is_err());
        assert!(backend("file:///etc/passwd").is_err());
    }

    #[test]
    fn test_garbage_endpoint_rejected() {
        assert!(backend("not a url").is_err());
    }

    #[test]
    fn test_submit_request_wire_shape() {
        let request = SubmitRequest {
            kind: JobKind::WorkflowExecution,
            params: serde_json::json!({"workflow_id": 7}),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["kind"], "workflow_execution");
        assert_eq!(json["params"]["workflow_id"], 7);
    }
}
