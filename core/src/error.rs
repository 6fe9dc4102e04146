//! Error types for the Iterable API client.
//!
//! # Design
//! Remote failures are not errors here: a 4xx or 5xx reply comes back as an
//! `ApiResponse` carrying the status and body, and the caller inspects it.
//! `ApiError` only covers what goes wrong on this side of the wire (building
//! the URL, encoding or decoding JSON, reading configuration) plus whatever
//! the transport reports when no response arrived at all.

use thiserror::Error;

/// Errors returned by `IterableClient` and its resources.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The configured base URL could not be parsed.
    #[error("invalid base url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The base URL cannot carry path segments (e.g. `mailto:` style URLs).
    #[error("base url cannot be a base: {0}")]
    CannotBeABase(String),

    /// A path identifier (email, user id) is empty, `.` or `..`, which
    /// would resolve to a different route.
    #[error("invalid path segment: {0:?}")]
    InvalidPathSegment(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// A response body could not be deserialized into the requested type.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// No HTTP response was obtained (DNS, connection refused, TLS, ...).
    #[error("transport failed: {0}")]
    Transport(#[from] ureq::Error),

    /// A required environment variable is not set.
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),
}
