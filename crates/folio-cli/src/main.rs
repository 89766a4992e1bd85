//! Folio CLI - operator tooling for the portfolio admin backend
//!
//! Seeds the bootstrap admin, issues and checks session tokens, rotates
//! passwords and inspects the collection store.

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod commands;
mod config;
mod helpers;

use app::AppContext;
use cli::{Cli, Commands};

const DEFAULT_LOG_FILTER: &str = "folio=warn,folio_core=warn";
const VERBOSE_LOG_FILTER: &str = "folio=debug,folio_core=debug";

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        generate(*shell, &mut cmd, "folio", &mut std::io::stdout());
        return Ok(());
    }

    let ctx = AppContext::boot(&cli)?;

    match &cli.command {
        Commands::Init => commands::handle_init(&ctx),
        Commands::Login(args) => commands::handle_login(&ctx, args),
        Commands::Whoami(args) => commands::handle_whoami(&ctx, args),
        Commands::Passwd(args) => commands::handle_passwd(&ctx, args),
        Commands::Stats(args) => commands::handle_stats(&ctx, args),
        Commands::Collections => commands::handle_collections(&ctx),
        Commands::Find(args) => commands::handle_find(&ctx, args),
        Commands::Completions { .. } => Ok(()),
    }
}
