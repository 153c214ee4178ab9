//! Billing package mutations.
//!
//! Every mutation drops the cached package listing before issuing its
//! request, so the cache is stale-free even when the request fails.

use serde_json::{Value, json};
use tracing::info;

use crate::error::CloudError;
use crate::http::{HttpMethod, ParamMode, Params, Transport};

use super::{CloudClient, Sleeper};

const BUY_PATH: &str = "/cloud/buy";
const CANCEL_PATH: &str = "/cloud/cancel";
const UNLINK_PATH: &str = "/cloud/unlink";

/// Optional billing terms for [`CloudClient::package_buy`].
///
/// Unset fields are omitted from the request.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PackageBilling {
    /// Billing cycle identifier (`package_billing`).
    pub package_billing: Option<String>,
    /// Contract to bill against (`package_billing_contract_id`).
    pub contract_id: Option<String>,
}

impl PackageBilling {
    fn into_params(self) -> Params {
        let mut params = Params::new();
        params.insert(String::from("package_billing"), json!(self.package_billing));
        params.insert(
            String::from("package_billing_contract_id"),
            json!(self.contract_id),
        );
        params
    }
}

impl<T: Transport, S: Sleeper> CloudClient<T, S> {
    /// Buys a billing package for `plan`.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError`] when the purchase request fails.
    pub fn package_buy(
        &mut self,
        plan: &str,
        billing: PackageBilling,
    ) -> Result<Value, CloudError> {
        self.invalidate_packages("buy");
        self.api.request(
            HttpMethod::Get,
            &format!("{BUY_PATH}/{plan}"),
            ParamMode::Query,
            billing.into_params(),
        )
    }

    /// Cancels the billing package `mbpkgid`.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError`] when the cancellation request fails.
    pub fn package_cancel(&mut self, mbpkgid: &str) -> Result<Value, CloudError> {
        self.invalidate_packages("cancel");
        self.api.request(
            HttpMethod::Post,
            CANCEL_PATH,
            ParamMode::Body,
            package_params(mbpkgid),
        )
    }

    /// Unlinks the billing package `mbpkgid` from its location.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError`] when the unlink request fails.
    pub fn package_unlink(&mut self, mbpkgid: &str) -> Result<Value, CloudError> {
        self.invalidate_packages("unlink");
        self.api.request(
            HttpMethod::Get,
            UNLINK_PATH,
            ParamMode::Query,
            package_params(mbpkgid),
        )
    }

    fn invalidate_packages(&mut self, operation: &str) {
        info!(operation, "dropping cached package listing");
        self.packages.invalidate();
    }
}

fn package_params(mbpkgid: &str) -> Params {
    let mut params = Params::new();
    params.insert(String::from("mbpkgid"), Value::from(mbpkgid));
    params
}
