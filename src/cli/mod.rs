//! Command-line interface definitions for the `hvcloud` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::{Args, Parser, Subcommand};

/// Top-level CLI for the `hvcloud` binary.
#[derive(Debug, Parser)]
#[command(
    name = "hvcloud",
    about = "Manage HostVirtual cloud servers and billing packages",
    arg_required_else_help = true
)]
pub(crate) struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub(crate) verbose: u8,
    /// Operation to perform.
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Operations exposed by the `hvcloud` binary.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// List deployable images.
    Images,
    /// List billing plans.
    Plans,
    /// List billing packages.
    Packages {
        /// Only show active packages not bound to a server.
        #[arg(long)]
        available: bool,
    },
    /// List locations keyed by short code.
    Locations,
    /// List all servers.
    Servers,
    /// Show one server.
    Server(ServerArgs),
    /// Buy a billing package for a plan.
    Buy(BuyArgs),
    /// Cancel a billing package.
    Cancel(ServerArgs),
    /// Unlink a billing package from its location.
    Unlink(ServerArgs),
    /// Deploy a server on a billing package.
    Build(BuildArgs),
    /// Power a server on.
    Start(ServerArgs),
    /// Power a server off.
    Shutdown(ServerArgs),
    /// Delete (terminate) a server.
    Delete(ServerArgs),
    /// Block until a server reaches a state or disappears.
    Wait(WaitArgs),
    /// List BGP sessions.
    BgpSessions,
}

/// Arguments naming a single package or server.
#[derive(Debug, Args)]
pub(crate) struct ServerArgs {
    /// Package identifier (mbpkgid).
    pub(crate) mbpkgid: String,
}

/// Arguments for `hvcloud buy`.
#[derive(Debug, Args)]
pub(crate) struct BuyArgs {
    /// Plan to buy (for example `VR1x1x25`).
    pub(crate) plan: String,
    /// Billing cycle identifier.
    #[arg(long, value_name = "BILLING")]
    pub(crate) billing: Option<String>,
    /// Billing contract identifier.
    #[arg(long, value_name = "ID")]
    pub(crate) contract_id: Option<String>,
}

/// Arguments for `hvcloud build`.
#[derive(Debug, Args)]
pub(crate) struct BuildArgs {
    /// Package identifier (mbpkgid) to deploy on.
    pub(crate) mbpkgid: String,
    /// Fully qualified host name.
    #[arg(long)]
    pub(crate) fqdn: String,
    /// Location code (for example `LAX`).
    #[arg(long)]
    pub(crate) location: String,
    /// Image identifier.
    #[arg(long)]
    pub(crate) image: String,
}

/// Arguments for `hvcloud wait`.
#[derive(Debug, Args)]
pub(crate) struct WaitArgs {
    /// Package identifier (mbpkgid) of the server.
    pub(crate) mbpkgid: String,
    /// Wait until the server reports this `state`.
    #[arg(long, value_name = "STATE", required_unless_present = "gone", conflicts_with = "gone")]
    pub(crate) state: Option<String>,
    /// Wait until the server can no longer be fetched.
    #[arg(long)]
    pub(crate) gone: bool,
}
