//! Client for the HostVirtual cloud API.
//!
//! Every operation funnels through [`CloudClient::request`], which strips
//! unset parameters, authenticates with the API key in the query string and
//! maps non-2xx responses to [`CloudError::Api`]. Reference listings are
//! cached in single-slot caches for the lifetime of the client; only the
//! package cache is invalidated, by package mutations.

use std::collections::BTreeMap;
use std::env;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::cache::Slot;
use crate::config::{API_KEY_ENV, DEFAULT_ENDPOINT, HvConfig};
use crate::error::CloudError;
use crate::http::{
    self, HttpMethod, ParamMode, Params, ReqwestTransport, Timeouts, Transport,
};

mod bgp;
mod package;
mod reference;
mod server;
mod wait;

pub use package::PackageBilling;
pub use reference::is_available;
pub use server::ServerBuild;
pub use wait::{PollPolicy, Sleeper, ThreadSleeper};

/// A JSON object returned by the API (server, package, session...).
pub type Record = Map<String, Value>;

/// Synchronous client for the cloud API.
///
/// Methods that read or invalidate a cache take `&mut self`; one client is
/// meant to be driven from one thread. Use one client per thread to wait on
/// several servers concurrently.
#[derive(Debug)]
pub struct CloudClient<T = ReqwestTransport, S = ThreadSleeper> {
    api: Connection<T>,
    sleeper: S,
    poll: PollPolicy,
    images: Slot<Vec<Value>>,
    plans: Slot<Vec<Value>>,
    packages: Slot<Vec<Value>>,
    locations: Slot<BTreeMap<String, Value>>,
}

impl CloudClient {
    /// Creates a client for the production endpoint with default timeouts.
    ///
    /// When `api_key` is `None` the key is read from `HV_API_KEY`, falling
    /// back to an empty key.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::HttpClient`] when the HTTP client cannot be
    /// built.
    pub fn new(api_key: Option<String>) -> Result<Self, CloudError> {
        let transport = ReqwestTransport::new(Timeouts::default())
            .map_err(|err| CloudError::HttpClient(err.to_string()))?;
        Ok(Self::with_transport(
            resolve_api_key(api_key),
            DEFAULT_ENDPOINT,
            transport,
            ThreadSleeper,
        ))
    }

    /// Creates a client from layered configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::Config`] when the configuration fails
    /// validation and [`CloudError::HttpClient`] when the HTTP client cannot
    /// be built.
    pub fn from_config(config: &HvConfig) -> Result<Self, CloudError> {
        config.validate()?;
        let transport = ReqwestTransport::new(config.timeouts())
            .map_err(|err| CloudError::HttpClient(err.to_string()))?;
        Ok(
            Self::with_transport(&config.api_key, &config.endpoint, transport, ThreadSleeper)
                .with_poll_policy(config.poll_policy()),
        )
    }
}

impl<T: Transport, S: Sleeper> CloudClient<T, S> {
    /// Creates a client over an arbitrary transport and sleeper.
    #[must_use]
    pub fn with_transport(
        api_key: impl Into<String>,
        endpoint: &str,
        transport: T,
        sleeper: S,
    ) -> Self {
        Self {
            api: Connection {
                api_key: api_key.into(),
                endpoint: endpoint.trim_end_matches('/').to_owned(),
                transport,
            },
            sleeper,
            poll: PollPolicy::default(),
            images: Slot::new(),
            plans: Slot::new(),
            packages: Slot::new(),
            locations: Slot::new(),
        }
    }

    /// Replaces the poll budget used by [`CloudClient::server_wait_for`].
    #[must_use]
    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// API key sent with every request.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api.api_key
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.api.endpoint
    }

    /// Issues one API request and returns the decoded JSON body.
    ///
    /// `null` parameters are dropped. With [`ParamMode::Query`] the rest go
    /// in the query string, otherwise in a JSON body; the API key is always
    /// in the query string.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::Api`] for non-2xx responses,
    /// [`CloudError::Transport`] when no response was received and
    /// [`CloudError::Decode`] when a success body is not JSON.
    pub fn request(
        &self,
        method: HttpMethod,
        path: &str,
        mode: ParamMode,
        params: Params,
    ) -> Result<Value, CloudError> {
        self.api.request(method, path, mode, params)
    }
}

/// Endpoint, credentials and transport shared by every call.
#[derive(Debug)]
struct Connection<T> {
    api_key: String,
    endpoint: String,
    transport: T,
}

impl<T: Transport> Connection<T> {
    fn request(
        &self,
        method: HttpMethod,
        path: &str,
        mode: ParamMode,
        params: Params,
    ) -> Result<Value, CloudError> {
        let request =
            http::build_request(&self.endpoint, &self.api_key, method, path, mode, params);
        debug!(%method, path, ?mode, "issuing API request");

        let response =
            self.transport
                .execute(&request)
                .map_err(|err| CloudError::Transport {
                    method,
                    path: path.to_owned(),
                    message: err.message,
                })?;

        if !response.is_success() {
            let message = http::error_message(&response.body);
            warn!(%method, path, status = response.status, %message, "API request failed");
            return Err(CloudError::Api {
                method,
                path: path.to_owned(),
                status: response.status,
                message,
            });
        }

        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&response.body)
            .map_err(|err| CloudError::decode(method, path, err.to_string()))
    }

    fn get(&self, path: &str) -> Result<Value, CloudError> {
        self.request(HttpMethod::Get, path, ParamMode::Query, Params::new())
    }

    /// GETs `path` and expects a JSON array; `null` reads as empty.
    fn get_array(&self, path: &str) -> Result<Vec<Value>, CloudError> {
        match self.get(path)? {
            Value::Array(items) => Ok(items),
            Value::Null => Ok(Vec::new()),
            other => Err(CloudError::decode(
                HttpMethod::Get,
                path,
                format!("expected a JSON array, got {}", json_kind(&other)),
            )),
        }
    }

    /// GETs `path` and expects a JSON object; `null` reads as empty.
    fn get_object(&self, path: &str) -> Result<Record, CloudError> {
        match self.get(path)? {
            Value::Object(record) => Ok(record),
            Value::Null => Ok(Record::new()),
            other => Err(CloudError::decode(
                HttpMethod::Get,
                path,
                format!("expected a JSON object, got {}", json_kind(&other)),
            )),
        }
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn resolve_api_key(explicit: Option<String>) -> String {
    explicit
        .or_else(|| env::var(API_KEY_ENV).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests;
