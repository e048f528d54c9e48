mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use zoneweaver_core::Host;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::commands::HostCommand;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose, cli.global.quiet);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, quiet: bool) {
    let filter = match (quiet, verbosity) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a host connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "zw", &mut std::io::stdout());
            Ok(())
        }

        // Topology may run offline from a saved inventory
        Command::Topology(args) => commands::topology::handle(args, &cli.global).await,

        Command::Packages(args) => on_host(HostCommand::Packages(args), &cli.global).await,
        Command::Be(args) => on_host(HostCommand::Be(args), &cli.global).await,
        Command::Arc(args) => on_host(HostCommand::Arc(args), &cli.global).await,
        Command::Time(args) => on_host(HostCommand::Time(args), &cli.global).await,
        Command::Repos(args) => on_host(HostCommand::Repos(args), &cli.global).await,
    }
}

async fn on_host(cmd: HostCommand, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    let host_config = config::build_host_config(global, &cfg)?;
    let host = Host::new(host_config);
    host.connect().await?;

    tracing::debug!(command = ?cmd, "dispatching command");
    let result = commands::dispatch(cmd, &host, global).await;
    host.disconnect().await;
    result
}
