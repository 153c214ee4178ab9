//! BGP session listing.

use serde_json::Value;

use crate::error::CloudError;
use crate::http::{HttpMethod, Transport};

use super::{CloudClient, Sleeper};

const BGP_SESSIONS_PATH: &str = "/cloud/bgpsessions2";
const ROUTES_RECEIVED: &str = "routes_received";

impl<T: Transport, S: Sleeper> CloudClient<T, S> {
    /// Lists BGP sessions.
    ///
    /// The API double-encodes `routes_received` as a JSON string; it is
    /// decoded in place. Every other field is returned untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::Decode`] when the response is not an object
    /// with a `sessions` array, or when `routes_received` is not valid JSON.
    pub fn bgp_sessions(&self) -> Result<Vec<Value>, CloudError> {
        let mut sessions = match self.api.get_object(BGP_SESSIONS_PATH)?.remove("sessions") {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(sessions)) => sessions,
            Some(_) => {
                return Err(CloudError::decode(
                    HttpMethod::Get,
                    BGP_SESSIONS_PATH,
                    "`sessions` is not an array",
                ));
            }
        };

        for session in &mut sessions {
            decode_routes(session)?;
        }
        Ok(sessions)
    }
}

fn decode_routes(session: &mut Value) -> Result<(), CloudError> {
    let Some(field) = session.get_mut(ROUTES_RECEIVED) else {
        return Ok(());
    };
    if let Value::String(encoded) = field {
        let decoded = serde_json::from_str(encoded).map_err(|err| {
            CloudError::decode(
                HttpMethod::Get,
                BGP_SESSIONS_PATH,
                format!("{ROUTES_RECEIVED}: {err}"),
            )
        })?;
        *field = decoded;
    }
    Ok(())
}
