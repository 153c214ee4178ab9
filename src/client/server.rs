//! Server lifecycle calls.

use serde_json::Value;
use tracing::debug;

use crate::error::CloudError;
use crate::http::{HttpMethod, ParamMode, Params, Transport};

use super::{CloudClient, Record, Sleeper};

const SERVERS_PATH: &str = "/cloud/servers";
const SERVER_PATH: &str = "/cloud/server";

/// Parameters for [`CloudClient::server_build`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ServerBuild {
    /// Fully qualified host name for the new server.
    pub fqdn: String,
    /// Location code such as `"LAX"`; resolved to an id before sending.
    pub location: String,
    /// Image identifier to deploy.
    pub image: String,
    /// Extra build fields passed through verbatim. `fqdn`, `location` and
    /// `image` entries here are overridden by the fields above.
    pub extra: Record,
}

impl ServerBuild {
    /// Creates build parameters with no extra fields.
    #[must_use]
    pub fn new(
        fqdn: impl Into<String>,
        location: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            fqdn: fqdn.into(),
            location: location.into(),
            image: image.into(),
            extra: Record::new(),
        }
    }

    /// Adds an extra field to the build request.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}

impl<T: Transport, S: Sleeper> CloudClient<T, S> {
    /// Lists every server on the account. Never cached.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError`] when the listing cannot be fetched.
    pub fn servers(&self) -> Result<Value, CloudError> {
        self.api.get(SERVERS_PATH)
    }

    /// Fetches the record of server `mbpkgid`.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::Api`] when the server is unknown and
    /// [`CloudError::Decode`] when the body is not a JSON object.
    pub fn server(&self, mbpkgid: &str) -> Result<Record, CloudError> {
        self.api.get_object(&server_path(mbpkgid))
    }

    /// Deploys a server on package `mbpkgid`.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::NoSuchLocation`] when the location code is
    /// unknown, or the request error otherwise.
    pub fn server_build(&mut self, mbpkgid: &str, build: ServerBuild) -> Result<Value, CloudError> {
        let location_id = self.location_id(&build.location)?;
        let mut params = build.extra;
        params.insert(String::from("fqdn"), Value::String(build.fqdn));
        params.insert(String::from("location"), location_id);
        params.insert(String::from("image"), Value::String(build.image));
        self.api.request(
            HttpMethod::Post,
            &format!("{SERVER_PATH}/build/{mbpkgid}"),
            ParamMode::Body,
            params,
        )
    }

    /// Deletes (terminates) server `mbpkgid`.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError`] when the request fails.
    pub fn server_delete(&self, mbpkgid: &str) -> Result<Value, CloudError> {
        self.server_action("delete", mbpkgid)
    }

    /// Powers server `mbpkgid` on.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError`] when the request fails.
    pub fn server_start(&self, mbpkgid: &str) -> Result<Value, CloudError> {
        self.server_action("start", mbpkgid)
    }

    /// Powers server `mbpkgid` off.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError`] when the request fails.
    pub fn server_shutdown(&self, mbpkgid: &str) -> Result<Value, CloudError> {
        self.server_action("shutdown", mbpkgid)
    }

    /// Brings server `mbpkgid` to the state described by `fields`.
    ///
    /// The current record is fetched first. When every field already has
    /// the requested value (an absent field counts as `null`) the record is
    /// returned without a write. Otherwise the fields are merged into the
    /// record and the whole record is sent back with `PUT`.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError`] when the read or the write fails.
    pub fn server_modify(&self, mbpkgid: &str, fields: Record) -> Result<Value, CloudError> {
        let path = server_path(mbpkgid);
        let mut record = self.api.get_object(&path)?;

        let unchanged = fields
            .iter()
            .all(|(name, wanted)| record.get(name).unwrap_or(&Value::Null) == wanted);
        if unchanged {
            debug!(mbpkgid, "server already matches requested fields");
            return Ok(Value::Object(record));
        }

        record.extend(fields);
        self.api
            .request(HttpMethod::Put, &path, ParamMode::Body, record)
    }

    fn server_action(&self, action: &str, mbpkgid: &str) -> Result<Value, CloudError> {
        self.api.request(
            HttpMethod::Post,
            &format!("{SERVER_PATH}/{action}/{mbpkgid}"),
            ParamMode::Body,
            Params::new(),
        )
    }
}

fn server_path(mbpkgid: &str) -> String {
    format!("{SERVER_PATH}/{mbpkgid}")
}
