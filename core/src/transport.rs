//! Blocking execution of `HttpRequest` values.
//!
//! # Design
//! `Transport` is the only place network I/O happens. The default
//! implementation uses a `ureq` agent with status-as-error disabled so 4xx
//! and 5xx replies come back as data for the response wrapper. Timeouts,
//! pooling and TLS are whatever the agent provides; nothing is retried.

use std::fmt;

use ureq::Agent;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one request and returns the raw response.
///
/// Implementations must perform exactly one round-trip per call.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// `Transport` backed by a blocking `ureq` agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Wrap a caller-configured agent. The agent should have
    /// `http_status_as_error(false)`, otherwise non-2xx replies surface as
    /// `ApiError::Transport` instead of responses.
    pub fn with_agent(agent: Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut response = match (req.method, req.body) {
            (HttpMethod::Get, _) => {
                let mut builder = self.agent.get(req.url.as_str());
                for (name, value) in &req.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()?
            }
            (HttpMethod::Delete, _) => {
                let mut builder = self.agent.delete(req.url.as_str());
                for (name, value) in &req.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()?
            }
            (HttpMethod::Post, body) => {
                let mut builder = self.agent.post(req.url.as_str());
                for (name, value) in &req.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match body {
                    Some(body) => builder.send(body.as_bytes())?,
                    None => builder.send_empty()?,
                }
            }
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
