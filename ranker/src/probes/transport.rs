//! HTTP transport used by the probes
//!
//! Probes talk to endpoints through [`HttpTransport`] so the chain processor
//! can be exercised against injected transports in tests.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::errors::ProbeError;

/// Fully read HTTP response
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
    /// Time until response headers arrived
    pub latency: Duration,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fail with [`ProbeError::Status`] unless the status is 2xx
    pub fn ensure_success(self, url: &str) -> Result<Self, ProbeError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ProbeError::Status {
                url: url.to_string(),
                status: self.status,
            })
        }
    }

    pub fn json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ProbeError> {
        if self.body.trim().is_empty() {
            return Err(ProbeError::Parse {
                url: url.to_string(),
                reason: "empty body".to_string(),
            });
        }
        serde_json::from_str(&self.body).map_err(|e| ProbeError::Parse {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, deadline: Duration) -> Result<HttpReply, ProbeError>;

    async fn post_json(
        &self,
        url: &str,
        body: &Value,
        deadline: Duration,
    ) -> Result<HttpReply, ProbeError>;
}

/// Production transport backed by a shared `reqwest` client
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: HttpClient,
}

impl ReqwestTransport {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    async fn execute(
        &self,
        url: &str,
        request: reqwest::RequestBuilder,
        deadline: Duration,
    ) -> Result<HttpReply, ProbeError> {
        let start = Instant::now();

        let response = timeout(deadline, request.timeout(deadline).send())
            .await
            .map_err(|_| ProbeError::Timeout {
                url: url.to_string(),
                timeout_ms: deadline.as_millis(),
            })?
            .map_err(|e| map_reqwest_error(url, deadline, e))?;

        let latency = start.elapsed();
        let status = response.status().as_u16();

        let body = response
            .text()
            .await
            .map_err(|e| map_reqwest_error(url, deadline, e))?;

        Ok(HttpReply {
            status,
            body,
            latency,
        })
    }
}

fn map_reqwest_error(url: &str, deadline: Duration, err: reqwest::Error) -> ProbeError {
    if err.is_timeout() {
        ProbeError::Timeout {
            url: url.to_string(),
            timeout_ms: deadline.as_millis(),
        }
    } else {
        ProbeError::Transport {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, deadline: Duration) -> Result<HttpReply, ProbeError> {
        self.execute(url, self.client.get(url), deadline).await
    }

    async fn post_json(
        &self,
        url: &str,
        body: &Value,
        deadline: Duration,
    ) -> Result<HttpReply, ProbeError> {
        self.execute(url, self.client.post(url).json(body), deadline)
            .await
    }
}
