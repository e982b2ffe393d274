mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod form;
mod infra;
mod logging;
mod services;
mod store;
mod workflow;

use std::io;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::shell::Shell;
use crate::config::{AppConfig, ConfigOverrides};
use crate::context::AppContext;
use crate::error::AppResult;
use crate::logging::init_logging;

#[derive(Parser)]
#[command(name = "ticketdesk", author, version, about = "In-memory support ticket tracker")]
struct Cli {
    /// Path to the JSON config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log filter, e.g. `debug` or `ticketdesk=info`. Defaults to RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive ticket shell.
    Shell(ShellArgs),
    /// Manage configuration.
    Config(ConfigArgs),
}

#[derive(Args)]
struct ShellArgs {
    /// Status scheme: assistance or resolution.
    #[arg(long)]
    scheme: Option<String>,
    /// Rating policy: terminal-only or lenient.
    #[arg(long)]
    rating_policy: Option<String>,
    /// Id strategy: sequential, clock or uuid.
    #[arg(long)]
    ids: Option<String>,
    /// Track ticket priority: on or off.
    #[arg(long)]
    priority: Option<String>,
}

fn main() {
    if let Err(error) = run() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn run() -> AppResult<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    match cli.command {
        Commands::Config(args) => config_cmd::run(args.command, cli.config.as_deref()),
        Commands::Shell(args) => run_shell(args, cli.config),
    }
}

fn run_shell(args: ShellArgs, config_path: Option<PathBuf>) -> AppResult<()> {
    let overrides = ConfigOverrides {
        scheme: args.scheme,
        rating_policy: args.rating_policy,
        ids: args.ids,
        priority: args.priority,
    };
    let config = AppConfig::load(config_path.as_deref(), &overrides)?;
    info!(
        scheme = config.status_scheme.as_str(),
        rating_policy = config.rating_policy.as_str(),
        ids = config.id_strategy.as_str(),
        "starting shell"
    );

    let stdin = io::stdin();
    let mut shell = Shell::new(AppContext::new(config), stdin.lock(), io::stdout());
    shell.run()?;

    let ctx = shell.into_context();
    info!(tickets = ctx.store.len(), "shell closed, discarding tickets");
    Ok(())
}
