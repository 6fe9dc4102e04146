//! The response wrapper returned by every resource method.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpResponse;

/// Body of a reply: parsed JSON when it parses, the raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

/// Status, headers and body of one API call.
///
/// Built for every reply regardless of status; a 404 or 500 is a value the
/// caller inspects, not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Reply headers in wire order. Values that are not valid UTF-8 are
    /// dropped by the transport.
    pub headers: Vec<(String, String)>,
    pub body: ResponseBody,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The JSON body, if the reply was JSON.
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    /// Deserialize the body into `T`. A non-JSON body is tried as a JSON
    /// string so `T = String` still works for plain-text replies.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let value = match &self.body {
            ResponseBody::Json(value) => value.clone(),
            ResponseBody::Text(text) => Value::String(text.clone()),
        };
        serde_json::from_value(value).map_err(ApiError::Deserialization)
    }
}

impl From<HttpResponse> for ApiResponse {
    fn from(response: HttpResponse) -> Self {
        let body = if response.body.trim().is_empty() {
            ResponseBody::Text(response.body)
        } else {
            match serde_json::from_str(&response.body) {
                Ok(value) => ResponseBody::Json(value),
                Err(_) => ResponseBody::Text(response.body),
            }
        };
        Self {
            status: response.status,
            headers: response.headers,
            body,
        }
    }
}
