//! Briventory CLI
//!
//! Command-line administration of a Briventory store

use briventory_core::logging_facility::{init, Profile};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "briventory")]
#[command(about = "Briventory - LEGO inventory administration", long_about = None)]
struct Cli {
    /// Path to the store database
    #[arg(
        long,
        global = true,
        env = "BRIVENTORY_DB",
        default_value = ".briventory/store.db"
    )]
    db: PathBuf,

    /// Emit JSON logs on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    /// Emit debug logs on stderr
    #[arg(short, long, global = true, conflicts_with = "json_logs")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create the store and any missing tables
    Init,
    /// Account administration
    Accounts(commands::accounts::AccountsArgs),
}

fn main() {
    let cli = Cli::parse();

    if cli.json_logs {
        init(Profile::Production);
    } else if cli.verbose {
        init(Profile::Development);
    }

    let result = match cli.command {
        Commands::Init => commands::init::execute(&cli.db),
        Commands::Accounts(args) => commands::accounts::execute(&cli.db, args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
