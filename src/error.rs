//! Error type surfaced by the cloud API client.

use thiserror::Error;

use crate::config::ConfigError;
use crate::http::HttpMethod;

/// Errors raised by [`crate::CloudClient`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum CloudError {
    /// Raised when the API answers with a non-2xx status.
    #[error("failed {method} {path} - ({status}) {message}")]
    Api {
        /// HTTP method of the failed request.
        method: HttpMethod,
        /// API path of the failed request.
        path: String,
        /// HTTP status code returned by the API.
        status: u16,
        /// Value of `error.message` in the response body, or empty.
        message: String,
    },
    /// Raised when a location code does not resolve to a location id.
    #[error("no such location {code}")]
    NoSuchLocation {
        /// Upper-cased code that failed to resolve.
        code: String,
    },
    /// Raised when a server never satisfies the wait predicate.
    #[error("timed out waiting on server (mbpkgid={mbpkgid})")]
    WaitTimeout {
        /// Package identifier of the server being polled.
        mbpkgid: String,
    },
    /// Raised when the request never produced an HTTP response.
    #[error("transport failure on {method} {path}: {message}")]
    Transport {
        /// HTTP method of the attempted request.
        method: HttpMethod,
        /// API path of the attempted request.
        path: String,
        /// Message reported by the HTTP stack.
        message: String,
    },
    /// Raised when a response body does not have the expected JSON shape.
    #[error("unexpected response to {method} {path}: {message}")]
    Decode {
        /// HTTP method of the request.
        method: HttpMethod,
        /// API path of the request.
        path: String,
        /// Description of the decoding failure.
        message: String,
    },
    /// Raised when the client configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),
    /// Raised when the HTTP client cannot be constructed.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

impl CloudError {
    /// Returns the HTTP status for [`CloudError::Api`] errors.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn decode(method: HttpMethod, path: &str, message: impl Into<String>) -> Self {
        Self::Decode {
            method,
            path: path.to_owned(),
            message: message.into(),
        }
    }
}

impl From<ConfigError> for CloudError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value.to_string())
    }
}
