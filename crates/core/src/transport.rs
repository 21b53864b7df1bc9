//! HTTP transport capability.
//!
//! The lookup client never talks to the network directly. It builds a [`TransportRequest`] and
//! hands it to an injected transport, blocking ([`BlockingTransport`]) or suspending
//! ([`AsyncTransport`]). The transport returns the status and body of whatever came back; it does
//! not interpret status codes, retry, or cache.
//!
//! [`ReqwestTransport`] is the production implementation. It builds a fresh HTTP client for every
//! call, so each lookup owns its connection for exactly one request and releases it when the call
//! returns on any path. Dropping the future returned by the async variant aborts the request.

use crate::constants::AUTHORIZATION_HEADER;
use crate::{PdsError, PdsResult};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// A single authenticated GET.
#[derive(Clone)]
pub struct TransportRequest {
    pub url: String,
    /// Header name/value pairs in send order.
    pub headers: Vec<(&'static str, String)>,
    pub timeout: Duration,
}

impl TransportRequest {
    /// Value of the first header named `name` (ASCII case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Debug for TransportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case(AUTHORIZATION_HEADER) {
                    (*name, "<redacted>")
                } else {
                    (*name, value.as_str())
                }
            })
            .collect();

        f.debug_struct("TransportRequest")
            .field("url", &self.url)
            .field("headers", &headers)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Status and full body of a completed HTTP exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs a GET on the calling thread.
pub trait BlockingTransport: Send + Sync {
    /// # Errors
    ///
    /// Returns [`PdsError::Connection`] when no HTTP response was obtained (connect failure,
    /// timeout, interrupted body). Non-2xx statuses are returned as ordinary responses.
    fn get(&self, request: &TransportRequest) -> PdsResult<TransportResponse>;
}

/// Performs a GET, yielding to the caller's scheduler while waiting.
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    /// Same contract as [`BlockingTransport::get`].
    async fn get(&self, request: &TransportRequest) -> PdsResult<TransportResponse>;
}

/// `reqwest`-backed transport implementing both calling conventions.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReqwestTransport;

impl ReqwestTransport {
    pub fn new() -> Self {
        Self
    }
}

impl BlockingTransport for ReqwestTransport {
    fn get(&self, request: &TransportRequest) -> PdsResult<TransportResponse> {
        let client = reqwest::blocking::Client::builder()
            .timeout(request.timeout)
            .build()
            .map_err(|e| PdsError::Connection(format!("failed to create HTTP client: {e}")))?;

        let mut builder = client.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }

        let response = builder
            .send()
            .map_err(|e| connection_error(e, request.timeout))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| connection_error(e, request.timeout))?;

        Ok(TransportResponse { status, body })
    }
}

#[async_trait]
impl AsyncTransport for ReqwestTransport {
    async fn get(&self, request: &TransportRequest) -> PdsResult<TransportResponse> {
        let client = reqwest::Client::builder()
            .timeout(request.timeout)
            .build()
            .map_err(|e| PdsError::Connection(format!("failed to create HTTP client: {e}")))?;

        let mut builder = client.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| connection_error(e, request.timeout))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| connection_error(e, request.timeout))?;

        Ok(TransportResponse { status, body })
    }
}

fn connection_error(err: reqwest::Error, timeout: Duration) -> PdsError {
    if err.is_timeout() {
        PdsError::Connection(format!("request timed out after {}s", timeout.as_secs()))
    } else if err.is_connect() {
        PdsError::Connection(format!("could not connect to PDS: {err}"))
    } else {
        PdsError::Connection(err.to_string())
    }
}
