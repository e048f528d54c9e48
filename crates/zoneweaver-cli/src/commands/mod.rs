//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod arc;
pub mod be;
pub mod config_cmd;
pub mod packages;
pub mod repos;
pub mod time;
pub mod topology;
pub mod util;

use zoneweaver_core::Host;

use crate::cli::{ArcArgs, BeArgs, GlobalOpts, PackagesArgs, ReposArgs, TimeArgs};
use crate::error::CliError;

/// Subcommands that need a connected host.
#[derive(Debug)]
pub enum HostCommand {
    Packages(PackagesArgs),
    Be(BeArgs),
    Arc(ArcArgs),
    Time(TimeArgs),
    Repos(ReposArgs),
}

/// Dispatch a host-bound administration command to its handler.
pub async fn dispatch(cmd: HostCommand, host: &Host, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        HostCommand::Packages(args) => packages::handle(host, args, global).await,
        HostCommand::Be(args) => be::handle(host, args, global).await,
        HostCommand::Arc(args) => arc::handle(host, args, global).await,
        HostCommand::Time(args) => time::handle(host, args, global).await,
        HostCommand::Repos(args) => repos::handle(host, args, global).await,
    }
}
