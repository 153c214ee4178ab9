//! HTTP plumbing for the cloud API.
//!
//! Requests and responses are described as plain data so the client core
//! can be driven by any [`Transport`]. The production transport wraps a
//! blocking `reqwest` client; tests substitute a scripted one.

use std::fmt;
use std::time::Duration;

use serde_json::{Map, Value};
use thiserror::Error;

mod transport;

pub use transport::ReqwestTransport;

/// Default connect timeout applied to every request.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(3100);
/// Default read timeout applied to every request.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(29);

/// Name of the query parameter carrying the API key.
pub const API_KEY_PARAM: &str = "key";

/// Request parameters keyed by field name.
///
/// `null` values mean "not set" and are removed by [`sanitize`] before the
/// request is encoded.
pub type Params = Map<String, Value>;

/// HTTP method used by the cloud API.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
}

impl HttpMethod {
    /// Returns the method name as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where request parameters are encoded.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParamMode {
    /// Parameters are appended to the URL query string.
    Query,
    /// Parameters are sent as a JSON object body.
    Body,
}

/// Connect and read timeouts for the HTTP transport.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Timeouts {
    /// Upper bound on establishing the TCP/TLS connection.
    pub connect: Duration,
    /// Upper bound on the whole exchange once connected.
    pub read: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: DEFAULT_CONNECT_TIMEOUT,
            read: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// A fully-resolved API request.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// API path relative to the endpoint (for example `/cloud/images`).
    pub path: String,
    /// Absolute URL without the query string.
    pub url: String,
    /// Query pairs in transmission order; the API key is always first.
    pub query: Vec<(String, String)>,
    /// JSON body for [`ParamMode::Body`] requests.
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Returns the value of the first query pair named `name`.
    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Raw status and body returned by a transport.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl ApiResponse {
    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Failure to obtain any HTTP response (DNS, connect, timeout, TLS).
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{message}")]
pub struct TransportError {
    /// Message reported by the HTTP stack.
    pub message: String,
}

impl TransportError {
    /// Wraps a transport failure message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Executes [`ApiRequest`] values against the network.
pub trait Transport {
    /// Sends the request and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no HTTP response was received.
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Removes every `null` parameter.
///
/// The API treats an explicit `null` differently from an omitted field, so
/// unset values must never reach the wire.
pub fn sanitize(params: &mut Params) {
    params.retain(|_, value| !value.is_null());
}

/// Builds an [`ApiRequest`] for `path` on `endpoint`, sanitising `params`
/// and placing them according to `mode`.
#[must_use]
pub fn build_request(
    endpoint: &str,
    api_key: &str,
    method: HttpMethod,
    path: &str,
    mode: ParamMode,
    mut params: Params,
) -> ApiRequest {
    sanitize(&mut params);
    let mut query = vec![(API_KEY_PARAM.to_owned(), api_key.to_owned())];
    let body = match mode {
        ParamMode::Query => {
            query.extend(
                params
                    .into_iter()
                    .map(|(name, value)| (name, query_text(value))),
            );
            None
        }
        ParamMode::Body => Some(Value::Object(params)),
    };
    ApiRequest {
        method,
        path: path.to_owned(),
        url: format!("{endpoint}{path}"),
        query,
        body,
    }
}

fn query_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

/// Pulls `error.message` out of an error body, falling back to `""`.
#[must_use]
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_default()
}
