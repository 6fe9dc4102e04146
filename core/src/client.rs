//! Shared request plumbing for every resource.
//!
//! # Design
//! `IterableClient` owns an immutable `Config` and a `Transport`. Resource
//! handles (`Lists`, `Users`) borrow the client and funnel every operation
//! through `send`, which builds the request, performs exactly one
//! round-trip and wraps the reply. The client carries no mutable state, so
//! clones can be used from several threads at once.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::error::ApiError;
use crate::http::{build_request, encode_body, HttpMethod};
use crate::lists::Lists;
use crate::response::ApiResponse;
use crate::transport::{Transport, UreqTransport};
use crate::users::Users;

/// Blocking client for the Iterable REST API.
#[derive(Clone)]
pub struct IterableClient {
    config: Config,
    transport: Arc<dyn Transport>,
}

impl IterableClient {
    /// Client using the default `ureq` transport.
    pub fn new(config: Config) -> Self {
        Self::with_transport(config, Arc::new(UreqTransport::new()))
    }

    /// Client configured from `ITERABLE_API_KEY` / `ITERABLE_BASE_URL`.
    pub fn from_env() -> Result<Self, ApiError> {
        Ok(Self::new(Config::from_env()?))
    }

    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn lists(&self) -> Lists<'_> {
        Lists::new(self)
    }

    pub fn users(&self) -> Users<'_> {
        Users::new(self)
    }

    pub(crate) fn get(&self, segments: &[&str], query: &[(&str, String)]) -> Result<ApiResponse, ApiError> {
        self.send(HttpMethod::Get, segments, query, None)
    }

    pub(crate) fn delete(&self, segments: &[&str]) -> Result<ApiResponse, ApiError> {
        self.send(HttpMethod::Delete, segments, &[], None)
    }

    pub(crate) fn post<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> Result<ApiResponse, ApiError> {
        let body = encode_body(body)?;
        self.send(HttpMethod::Post, segments, &[], Some(body))
    }

    fn send(
        &self,
        method: HttpMethod,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<String>,
    ) -> Result<ApiResponse, ApiError> {
        let request = build_request(&self.config, method, segments, query, body)?;
        debug!(method = method.as_str(), url = %request.url, "sending request");
        let response = self.transport.execute(request)?;
        debug!(method = method.as_str(), status = response.status, "received response");
        Ok(ApiResponse::from(response))
    }
}

impl fmt::Debug for IterableClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterableClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-process transport that records requests and replays a canned reply.

    use std::sync::Mutex;

    use super::*;
    use crate::http::{HttpRequest, HttpResponse};

    pub struct RecordingTransport {
        pub requests: Mutex<Vec<HttpRequest>>,
        status: u16,
        body: String,
    }

    impl RecordingTransport {
        pub fn replying(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                status,
                body: body.to_string(),
            })
        }

        pub fn single(&self) -> HttpRequest {
            let requests = self.requests.lock().unwrap();
            assert_eq!(requests.len(), 1, "expected exactly one outbound request");
            requests[0].clone()
        }

        pub fn single_body(&self) -> serde_json::Value {
            serde_json::from_str(self.single().body.as_deref().expect("request has a body")).unwrap()
        }
    }

    impl Transport for RecordingTransport {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.requests.lock().unwrap().push(request);
            Ok(HttpResponse {
                status: self.status,
                headers: Vec::new(),
                body: self.body.clone(),
            })
        }
    }

    pub fn client_with(transport: &Arc<RecordingTransport>) -> IterableClient {
        IterableClient::with_transport(
            Config::new("test-key", "http://localhost:3000/api"),
            transport.clone(),
        )
    }
}
