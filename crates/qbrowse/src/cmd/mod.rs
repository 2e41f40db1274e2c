use clap::{Args, Subcommand};
use std::path::PathBuf;

use qbrowse::broker::BrokerEndpoint;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod browse;
pub mod resolve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Browse a queue's backlog without consuming it.
    Browse(BrowseArgs),
    /// Print the directory configuration derived for a queue.
    Resolve(ResolveArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Browse(args) => browse::run(args, format),
        Command::Resolve(args) => resolve::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Who is browsing which queue, and where the broker is.
#[derive(Args, Debug)]
pub struct IdentityArgs {
    /// Queue to browse.
    pub queue: String,
    /// Broker user name.
    #[arg(long, short = 'u')]
    pub user: String,
    /// Pre-issued access key for the user.
    #[arg(long, env = "QBROWSE_ACCESS_KEY", hide_env_values = true)]
    pub access_key: String,
    /// Broker host.
    #[arg(long, default_value = "localhost")]
    pub host: String,
    /// Broker port.
    #[arg(long, default_value = "5672")]
    pub port: u16,
}

impl IdentityArgs {
    pub fn endpoint(&self) -> BrokerEndpoint {
        BrokerEndpoint {
            host: self.host.clone(),
            port: self.port,
            ..BrokerEndpoint::default()
        }
    }
}

#[derive(Args, Debug)]
pub struct BrowseArgs {
    #[command(flatten)]
    pub identity: IdentityArgs,
    /// JSON spool file holding credentials and queue backlogs.
    #[arg(long, value_name = "FILE")]
    pub spool: PathBuf,
    /// Stop after N messages.
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub identity: IdentityArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
