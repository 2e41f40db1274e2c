mod cmd;
mod exit;
mod logging;
mod output;
mod spool;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "qbrowse", version, about = "Non-destructive message queue browser")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    match cmd::run(cli.command, format) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_browse_subcommand() {
        let cli = Cli::try_parse_from([
            "qbrowse",
            "browse",
            "orders",
            "--user",
            "alice",
            "--access-key",
            "key123",
            "--spool",
            "/tmp/spool.json",
            "--limit",
            "5",
        ])
        .expect("browse args should parse");

        match cli.command {
            Command::Browse(args) => {
                assert_eq!(args.identity.queue, "orders");
                assert_eq!(args.identity.port, 5672);
                assert_eq!(args.limit, Some(5));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn browse_requires_spool() {
        let err = Cli::try_parse_from([
            "qbrowse",
            "browse",
            "orders",
            "--user",
            "alice",
            "--access-key",
            "key123",
        ])
        .expect_err("missing --spool should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn parses_resolve_with_endpoint() {
        let cli = Cli::try_parse_from([
            "qbrowse",
            "--format",
            "json",
            "resolve",
            "orders",
            "-u",
            "alice",
            "--access-key",
            "k",
            "--host",
            "mq.internal",
            "--port",
            "5673",
        ])
        .expect("resolve args should parse");

        assert!(matches!(cli.format, Some(OutputFormat::Json)));
        match cli.command {
            Command::Resolve(args) => {
                let endpoint = args.identity.endpoint();
                assert_eq!(endpoint.host, "mq.internal");
                assert_eq!(endpoint.port, 5673);
                assert_eq!(endpoint.client_id, "carbon");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
