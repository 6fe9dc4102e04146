//! Client configuration: the API key and the base endpoint.

use std::fmt;

use crate::error::ApiError;

/// Production endpoint used when no base URL is supplied.
pub const DEFAULT_BASE_URL: &str = "https://api.iterable.com/api";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "ITERABLE_API_KEY";

/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "ITERABLE_BASE_URL";

/// API key and base URL for one client instance. Immutable once built.
///
/// The key is not validated; an empty key simply produces requests the
/// server will reject.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    api_key: String,
    base_url: String,
}

impl Config {
    pub fn new(api_key: impl Into<String>, base_url: &str) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Config pointing at [`DEFAULT_BASE_URL`].
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self::new(api_key, DEFAULT_BASE_URL)
    }

    /// Read [`API_KEY_ENV`] (required) and [`BASE_URL_ENV`] (optional).
    pub fn from_env() -> Result<Self, ApiError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| ApiError::MissingEnv(API_KEY_ENV))?;
        let base_url = std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Ok(Self::new(api_key, &base_url))
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}
