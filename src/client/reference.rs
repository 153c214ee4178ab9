//! Cached reference listings: images, plans, packages and locations.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::CloudError;
use crate::http::Transport;

use super::{CloudClient, Sleeper};

const IMAGES_PATH: &str = "/cloud/images";
const PLANS_PATH: &str = "/cloud/sizes";
pub(super) const PACKAGES_PATH: &str = "/cloud/packages";
const LOCATIONS_PATH: &str = "/cloud/locations";

const LOCATION_LABEL_SEPARATOR: &str = " - ";

impl<T: Transport, S: Sleeper> CloudClient<T, S> {
    /// Lists deployable images. Fetched once, then served from cache.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError`] when the listing cannot be fetched.
    pub fn images(&mut self) -> Result<&[Value], CloudError> {
        self.images
            .get_or_try_fill(|| self.api.get_array(IMAGES_PATH))
            .map(Vec::as_slice)
    }

    /// Lists billing plans. Fetched once, then served from cache.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError`] when the listing cannot be fetched.
    pub fn plans(&mut self) -> Result<&[Value], CloudError> {
        self.plans
            .get_or_try_fill(|| self.api.get_array(PLANS_PATH))
            .map(Vec::as_slice)
    }

    /// Lists every billing package on the account.
    ///
    /// Served from cache until a package mutation invalidates it.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError`] when the listing cannot be fetched.
    pub fn packages(&mut self) -> Result<&[Value], CloudError> {
        self.packages
            .get_or_try_fill(|| self.api.get_array(PACKAGES_PATH))
            .map(Vec::as_slice)
    }

    /// Lists packages that are active and not bound to a server.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError`] when the package listing cannot be fetched.
    pub fn available_packages(&mut self) -> Result<Vec<Value>, CloudError> {
        Ok(self
            .packages()?
            .iter()
            .filter(|package| is_available(package))
            .cloned()
            .collect())
    }

    /// Lists locations keyed by their upper-case short code.
    ///
    /// The API keys locations by a label such as `"US - United States"`;
    /// the part before the first `" - "` becomes the code.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError`] when the listing cannot be fetched.
    pub fn locations(&mut self) -> Result<&BTreeMap<String, Value>, CloudError> {
        self.locations.get_or_try_fill(|| {
            let listing = self.api.get_object(LOCATIONS_PATH)?;
            Ok(listing
                .into_iter()
                .map(|(label, location)| (location_code(&label), location))
                .collect())
        })
    }

    /// Resolves a location code (any case) to the location's `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::NoSuchLocation`] when the code is unknown or
    /// its record carries no `id`.
    pub fn location_id(&mut self, code: &str) -> Result<Value, CloudError> {
        let code = code.to_uppercase();
        self.locations()?
            .get(&code)
            .and_then(|location| location.get("id"))
            .cloned()
            .ok_or_else(|| CloudError::NoSuchLocation { code })
    }
}

/// Returns `true` for packages that are active and unassigned.
#[must_use]
pub fn is_available(package: &Value) -> bool {
    package.get("package_status").and_then(Value::as_str) == Some("Active")
        && is_unset(package, "package")
        && is_unset(package, "state")
}

fn is_unset(record: &Value, field: &str) -> bool {
    record.get(field).is_none_or(Value::is_null)
}

fn location_code(label: &str) -> String {
    label
        .split_once(LOCATION_LABEL_SEPARATOR)
        .map_or(label, |(code, _)| code)
        .to_uppercase()
}
