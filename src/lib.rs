//! Client library for the HostVirtual cloud API.
//!
//! The crate exposes a synchronous [`CloudClient`] covering billing
//! packages, server lifecycle (build, start, shutdown, delete, modify, wait)
//! and BGP session listing, plus layered configuration for the `hvcloud`
//! binary.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod test_support;

pub use client::{
    CloudClient, PackageBilling, PollPolicy, Record, ServerBuild, Sleeper, ThreadSleeper,
    is_available,
};
pub use config::{ConfigError, HvConfig};
pub use error::CloudError;
pub use http::{HttpMethod, ParamMode, Params, Transport};
