//! Blocking `reqwest` transport.

use reqwest::blocking::Client;
use reqwest::Method;
use tracing::trace;

use super::{ApiRequest, ApiResponse, HttpMethod, Timeouts, Transport, TransportError};

/// Transport backed by a blocking `reqwest` client with fixed timeouts.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds a transport applying `timeouts` to every request.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the TLS backend cannot be initialised.
    pub fn new(timeouts: Timeouts) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(timeouts.connect)
            .timeout(timeouts.read)
            .build()
            .map_err(|err| TransportError::new(err.to_string()))?;
        Ok(Self { client })
    }

    fn method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
        }
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut builder = self
            .client
            .request(Self::method(request.method), request.url.as_str())
            .query(&request.query);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .map_err(|err| TransportError::new(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|err| TransportError::new(err.to_string()))?;
        trace!(status, bytes = body.len(), "received API response");
        Ok(ApiResponse { status, body })
    }
}
