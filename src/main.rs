//! Binary entry point for the `hvcloud` CLI.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use hvcloud::{CloudClient, CloudError, HvConfig, PackageBilling, Record, ServerBuild};

mod cli;

use cli::{Cli, Command, WaitArgs};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Cloud(#[from] CloudError),
    #[error("failed to write output: {0}")]
    Output(String),
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let exit_code = match dispatch(cli.command) {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "hvcloud=warn",
            1 => "hvcloud=info",
            2 => "hvcloud=debug",
            _ => "hvcloud=trace",
        })
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .compact(),
        )
        .init();

    debug!(verbose, "tracing initialised");
}

fn dispatch(command: Command) -> Result<(), CliError> {
    let config =
        HvConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    let mut client = CloudClient::from_config(&config)?;

    let output = match command {
        Command::Images => Value::from(client.images()?.to_vec()),
        Command::Plans => Value::from(client.plans()?.to_vec()),
        Command::Packages { available: true } => Value::from(client.available_packages()?),
        Command::Packages { available: false } => Value::from(client.packages()?.to_vec()),
        Command::Locations => Value::Object(client.locations()?.clone().into_iter().collect()),
        Command::Servers => client.servers()?,
        Command::Server(args) => Value::Object(client.server(&args.mbpkgid)?),
        Command::Buy(args) => client.package_buy(
            &args.plan,
            PackageBilling {
                package_billing: args.billing,
                contract_id: args.contract_id,
            },
        )?,
        Command::Cancel(args) => client.package_cancel(&args.mbpkgid)?,
        Command::Unlink(args) => client.package_unlink(&args.mbpkgid)?,
        Command::Build(args) => client.server_build(
            &args.mbpkgid,
            ServerBuild::new(args.fqdn, args.location, args.image),
        )?,
        Command::Start(args) => client.server_start(&args.mbpkgid)?,
        Command::Shutdown(args) => client.server_shutdown(&args.mbpkgid)?,
        Command::Delete(args) => client.server_delete(&args.mbpkgid)?,
        Command::Wait(args) => Value::Object(wait(&client, &args)?),
        Command::BgpSessions => Value::from(client.bgp_sessions()?),
    };

    write_json(io::stdout(), &output)
}

fn wait(client: &CloudClient, args: &WaitArgs) -> Result<Record, CloudError> {
    match args.state.as_deref() {
        Some(wanted) => client.server_wait_for(&args.mbpkgid, |record| {
            record.get("state").and_then(Value::as_str) == Some(wanted)
        }),
        None => client.server_wait_for(&args.mbpkgid, Record::is_empty),
    }
}

fn write_json(mut target: impl Write, value: &Value) -> Result<(), CliError> {
    let rendered =
        serde_json::to_string_pretty(value).map_err(|err| CliError::Output(err.to_string()))?;
    writeln!(target, "{rendered}").map_err(|err| CliError::Output(err.to_string()))
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}
