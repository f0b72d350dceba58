//! Cherlygood CLI - Database migrations and catalog seeding.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! cherly-cli migrate
//!
//! # Load products, upsells and settings from YAML
//! cherly-cli seed --file crates/cli/seed/catalog.yaml
//!
//! # Replace the whole catalog
//! cherly-cli seed --file crates/cli/seed/catalog.yaml --clear
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cherly-cli")]
#[command(author, version, about = "Cherlygood CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Seed the catalog from a YAML file
    Seed {
        /// Path to the catalog YAML file
        #[arg(short, long)]
        file: String,

        /// Delete existing products, upsells and settings first
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { file, clear } => commands::seed::catalog(&file, clear).await?,
    }
    Ok(())
}
