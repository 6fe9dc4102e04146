//! HTTP wire types and the request builder.
//!
//! # Design
//! Requests and responses are plain data. `build_request` turns a
//! `Config`, path segments, query pairs and an already-encoded body into an
//! `HttpRequest`; a `Transport` executes it and hands back an `HttpResponse`.
//! Keeping the builder free of I/O lets every endpoint be tested without a
//! server.

use std::fmt;

use serde::Serialize;
use url::Url;

use crate::config::Config;
use crate::error::ApiError;

/// Header carrying the API key on every call.
pub const API_KEY_HEADER: &str = "Api-Key";

/// HTTP method for a request. The remote API only uses these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL including the encoded query string.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(k, v)| {
                if k.eq_ignore_ascii_case(API_KEY_HEADER) {
                    (k.as_str(), "<redacted>")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect();
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("body", &self.body)
            .finish()
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Encode a request payload as JSON.
pub fn encode_body<B: Serialize + ?Sized>(body: &B) -> Result<String, ApiError> {
    serde_json::to_string(body).map_err(ApiError::Serialization)
}

/// Build a request against `config.base_url()`.
///
/// Each entry of `segments` becomes one percent-encoded path segment, so an
/// email or user id containing `/`, `+` or spaces cannot escape its slot.
/// Empty, `.` and `..` segments are rejected: URL normalization drops them
/// (even in `%2E` form), which would send the call to a different route.
/// Query pairs are form-encoded in the given order.
pub fn build_request(
    config: &Config,
    method: HttpMethod,
    segments: &[&str],
    query: &[(&str, String)],
    body: Option<String>,
) -> Result<HttpRequest, ApiError> {
    if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
        return Err(ApiError::InvalidPathSegment((*bad).to_string()));
    }

    let mut url = Url::parse(config.base_url())?;
    url.path_segments_mut()
        .map_err(|()| ApiError::CannotBeABase(config.base_url().to_string()))?
        .pop_if_empty()
        .extend(segments);
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }

    let mut headers = vec![(API_KEY_HEADER.to_string(), config.api_key().to_string())];
    if body.is_some() {
        headers.push(("content-type".to_string(), "application/json".to_string()));
    }

    Ok(HttpRequest {
        method,
        url: url.into(),
        headers,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::new("test-key", "http://localhost:3000/api")
    }

    #[test]
    fn get_request_has_key_and_no_body() {
        let req = build_request(&config(), HttpMethod::Get, &["lists"], &[], None).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/api/lists");
        assert_eq!(req.header("api-key"), Some("test-key"));
        assert!(req.header("content-type").is_none());
        assert!(req.body.is_none());
    }

    #[test]
    fn body_adds_json_content_type() {
        let body = encode_body(&serde_json::json!({"name": "VIP"})).unwrap();
        let req = build_request(&config(), HttpMethod::Post, &["lists"], &[], Some(body)).unwrap();
        assert_eq!(
            req.headers,
            vec![
                ("Api-Key".to_string(), "test-key".to_string()),
                ("content-type".to_string(), "application/json".to_string()),
            ]
        );
        assert_eq!(req.body.as_deref(), Some(r#"{"name":"VIP"}"#));
    }

    #[test]
    fn path_segments_are_percent_encoded() {
        let req = build_request(
            &config(),
            HttpMethod::Delete,
            &["users", "a/b c@example.com"],
            &[],
            None,
        )
        .unwrap();
        assert_eq!(req.url, "http://localhost:3000/api/users/a%2Fb%20c@example.com");
    }

    #[test]
    fn query_pairs_are_form_encoded() {
        let req = build_request(
            &config(),
            HttpMethod::Get,
            &["users", "getByEmail"],
            &[("email", "jo+test@example.com".to_string())],
            None,
        )
        .unwrap();
        assert_eq!(
            req.url,
            "http://localhost:3000/api/users/getByEmail?email=jo%2Btest%40example.com"
        );
    }

    #[test]
    fn bare_host_base_url_gets_single_slash() {
        let config = Config::new("k", "http://localhost:3000");
        let req = build_request(&config, HttpMethod::Get, &["lists"], &[], None).unwrap();
        assert_eq!(req.url, "http://localhost:3000/lists");
    }

    #[test]
    fn dot_and_empty_segments_are_rejected() {
        for bad in ["..", ".", ""] {
            let err = build_request(&config(), HttpMethod::Delete, &["users", bad], &[], None)
                .unwrap_err();
            assert!(
                matches!(&err, ApiError::InvalidPathSegment(s) if s == bad),
                "{bad:?}: {err}"
            );
        }
    }

    #[test]
    fn dots_inside_a_segment_are_kept() {
        let req = build_request(
            &config(),
            HttpMethod::Get,
            &["users", "byUserId", "a..b"],
            &[],
            None,
        )
        .unwrap();
        assert_eq!(req.url, "http://localhost:3000/api/users/byUserId/a..b");
    }

    #[test]
    fn debug_output_hides_api_key_header() {
        let req = build_request(&config(), HttpMethod::Get, &["lists"], &[], None).unwrap();
        let printed = format!("{req:?}");
        assert!(!printed.contains("test-key"));
        assert!(printed.contains("<redacted>"));
        assert!(printed.contains("http://localhost:3000/api/lists"));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let config = Config::new("k", "not a url");
        let err = build_request(&config, HttpMethod::Get, &["lists"], &[], None).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn non_hierarchical_base_url_is_rejected() {
        let config = Config::new("k", "mailto:someone@example.com");
        let err = build_request(&config, HttpMethod::Get, &["lists"], &[], None).unwrap_err();
        assert!(matches!(err, ApiError::CannotBeABase(_)));
    }
}
