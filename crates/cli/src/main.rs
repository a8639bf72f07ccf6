//! Plateful CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! plateful-cli migrate
//!
//! # Create a superadmin account
//! plateful-cli admin create -e admin@example.com -u admin -f Ada -l Lovelace
//!
//! # Seed the database with demo data
//! plateful-cli seed
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` - Create superadmin accounts
//! - `seed` - Seed database with demo vendors and customers

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "plateful-cli")]
#[command(author, version, about = "Plateful CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage superadmin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database with demo data
    Seed,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new superadmin account
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Username
        #[arg(short, long)]
        username: String,

        /// First name
        #[arg(short, long)]
        first_name: String,

        /// Last name
        #[arg(short, long)]
        last_name: String,

        /// Password; a random one is generated and printed when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                username,
                first_name,
                last_name,
                password,
            } => {
                commands::admin::create_superadmin(
                    &email,
                    &username,
                    &first_name,
                    &last_name,
                    password.as_deref(),
                )
                .await?;
            }
        },
        Commands::Seed => commands::seed::run().await?,
    }
    Ok(())
}
