//! logfacade CLI
//!
//! Command-line driver for the logging facade

use clap::{Parser, Subcommand};
use logfacade_logging::{init, set_log_file, LoggerConfig};
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "logfacade")]
#[command(about = "logfacade - Leveled, colored logging to console and rotating files", long_about = None)]
struct Cli {
    /// TOML logger configuration to install before running the command
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Duplicate records to stdout and a rotating file at this path
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Emit one or more records
    Emit(commands::emit::EmitArgs),
    /// Emit a fatal record and abort
    Fatal(commands::emit::FatalArgs),
    /// Print the active logger configuration as TOML
    Config,
}

fn configure(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = &cli.config {
        init(LoggerConfig::from_toml_file(path)?)?;
    }
    if let Some(path) = &cli.log_file {
        set_log_file(path)?;
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let result = configure(&cli).and_then(|()| match cli.command {
        Commands::Emit(args) => commands::emit::execute(args),
        Commands::Fatal(args) => commands::emit::execute_fatal(args),
        Commands::Config => commands::config::execute(),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
