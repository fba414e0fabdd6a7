//! drivesync CLI - Command-line interface for drivesync
//!
//! Provides commands for:
//! - Initializing a local mirror
//! - Showing what differs between the local tree and the remote listing
//! - Planning pushes and pulls

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    diff::DiffCommand,
    init::InitCommand,
    plan::PlanCommand,
    CommandContext,
};
use drivesync_sync::reconciler::Direction;
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "drivesync",
    version,
    about = "Reconcile a local tree with a remote drive"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Initialize a drivesync context in a directory
    Init(InitCommand),
    /// Show what differs between the local tree and the remote listing
    Diff(DiffCommand),
    /// Plan the changes that make the remote side match the local tree
    Push(PlanCommand),
    /// Plan the changes that make the local tree match the remote side
    Pull(PlanCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let ctx = CommandContext::new(
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        },
        cli.config.clone(),
        cli.quiet,
    );

    // Setup tracing
    let filter = match (cli.quiet, cli.verbose) {
        (true, _) => "error".to_string(),
        (false, 0) => ctx.config().logging.level.clone(),
        (false, 1) => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command, &ctx).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ctx.formatter().error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, ctx: &CommandContext) -> Result<()> {
    match command {
        Commands::Init(cmd) => cmd.execute(ctx).await,
        Commands::Diff(cmd) => cmd.execute(ctx).await,
        Commands::Push(cmd) => cmd.execute(Direction::Push, ctx).await,
        Commands::Pull(cmd) => cmd.execute(Direction::Pull, ctx).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_push_flags() {
        let cli = Cli::parse_from([
            "drivesync",
            "--json",
            "push",
            "--force",
            "--hidden",
            "--manifest",
            "/tmp/remote.json",
        ]);
        assert!(cli.json);
        match cli.command {
            Commands::Push(cmd) => {
                assert!(cmd.force);
                assert!(!cmd.no_clobber);
                assert!(cmd.hidden);
                assert_eq!(cmd.manifest, Some(PathBuf::from("/tmp/remote.json")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["drivesync", "pull", "--no-clobber", "-vv", "--quiet"]);
        assert_eq!(cli.verbose, 2);
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::Pull(ref cmd) if cmd.no_clobber));
    }

    #[test]
    fn test_parse_init_default_dir() {
        let cli = Cli::parse_from(["drivesync", "init"]);
        match cli.command {
            Commands::Init(cmd) => assert_eq!(cmd.dir, PathBuf::from(".")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_reports_failure_chain() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = dir.path().join("config.yaml");
        std::fs::write(
            &config,
            format!("sync:\n  root: {}\n", dir.path().join("missing").display()),
        )
        .unwrap();
        let ctx = CommandContext::new(OutputFormat::Json, Some(config), true);
        let cli = Cli::parse_from(["drivesync", "pull", "--manifest", "/tmp/remote.json"]);

        let err = run(cli.command, &ctx).await.unwrap_err();

        let message = format!("{err:#}");
        assert!(message.contains("Invalid configuration"));
        assert!(message.contains("sync.root"));
        assert_eq!(
            output::error_document(&message)["success"],
            serde_json::json!(false)
        );
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
