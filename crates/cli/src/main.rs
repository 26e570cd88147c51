//! Aurelle CLI - Session-store migrations.
//!
//! # Usage
//!
//! ```bash
//! # Create the storefront session table
//! aurelle-cli migrate storefront
//!
//! # Create the admin session table
//! aurelle-cli migrate admin
//!
//! # Both
//! aurelle-cli migrate all
//! ```
//!
//! The REST backend owns every domain record, so the only tables either web
//! binary needs are the `tower_sessions` ones created here.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "aurelle-cli")]
#[command(author, version, about = "Aurelle CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum MigrateTarget {
    /// Create the storefront session table
    Storefront,
    /// Create the admin session table
    Admin,
    /// Both of the above
    All,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::migrate::MigrationError> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Storefront => commands::migrate::storefront().await?,
            MigrateTarget::Admin => commands::migrate::admin().await?,
            MigrateTarget::All => {
                commands::migrate::storefront().await?;
                commands::migrate::admin().await?;
            }
        },
    }
    Ok(())
}
