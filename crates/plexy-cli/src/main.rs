use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::CliContext;

#[derive(Parser)]
#[command(name = "plexydesk")]
#[command(about = "PlexyDesk session tool - inspect and maintain the saved desktop session", long_about = None)]
struct Cli {
    /// Use this directory instead of ~/.config/plexydesk
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work with the saved desktop session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Work with the desktop configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Print the saved session
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check that the session file parses cleanly
    Validate,
    /// Rewrite the session file in canonical form
    Normalize,
    /// Delete the saved session
    Reset,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = CliContext::new(cli.dir);

    match cli.command {
        Commands::Session { action } => match action {
            SessionAction::Show { json } => commands::session::show(&ctx, json)?,
            SessionAction::Validate => commands::session::validate(&ctx)?,
            SessionAction::Normalize => commands::session::normalize(&ctx)?,
            SessionAction::Reset => commands::session::reset(&ctx)?,
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&ctx)?,
        },
    }

    Ok(())
}
