//! Stonebridge CLI - Gate and CRM management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run an email through the authentication gate
//! sb-cli login -e buyer@example.com
//!
//! # Favorite a listing and push the profile to the CRM
//! sb-cli favorite "Botanica Lot 12"
//!
//! # Submit an inquiry under an explicit project
//! sb-cli inquire "Lot 9 display village" -p "Valley Rise"
//!
//! # Show which project a title classifies to
//! sb-cli classify "Harbourside Penthouse"
//! ```
//!
//! # Commands
//!
//! - `login` / `logout` / `profile` - Drive the authentication gate
//! - `favorite` / `unfavorite` / `compare` - Record listing interest
//! - `inquire` - Record an inquiry and wait for the CRM push
//! - `sync` - Push the stored profile through the transport cascade
//! - `classify` - Map a listing title to its project

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;
mod console;

#[derive(Parser)]
#[command(name = "sb-cli")]
#[command(author, version, about = "Stonebridge listings gateway CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an email through the gate's login flow
    Login {
        /// Email address to check against the CRM
        #[arg(short, long)]
        email: String,
    },
    /// Sign out; the stored profile and interest lists survive
    Logout,
    /// Show the stored visitor profile
    Profile,
    /// Favorite a listing and push the profile to the CRM
    Favorite {
        /// Listing title as displayed on the page
        title: String,
    },
    /// Remove a listing from the favorites
    Unfavorite {
        /// Listing title as displayed on the page
        title: String,
    },
    /// Record a comparison, storing the listing's project
    Compare {
        /// Listing title as displayed on the page
        title: String,
    },
    /// Record an inquiry and wait for the CRM push
    Inquire {
        /// Listing title as displayed on the page
        title: String,

        /// Project to record instead of the classified one
        #[arg(short, long)]
        project: Option<String>,

        /// Email from the inquiry form; overrides the stored one
        #[arg(short, long)]
        email: Option<String>,

        /// First name from the inquiry form
        #[arg(short, long)]
        name: Option<String>,

        /// Phone number from the inquiry form
        #[arg(long)]
        phone: Option<String>,
    },
    /// Push the stored profile through the transport cascade
    Sync,
    /// Show which project a listing title classifies to
    Classify {
        /// Listing title to classify
        title: String,
    },
}

#[tokio::main]
async fn main() {
    // Load .env before the subscriber so a RUST_LOG set there applies.
    let _ = dotenvy::dotenv();

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
        Commands::Login { email } => commands::gate::login(&email).await?,
        Commands::Logout => commands::gate::logout().await?,
        Commands::Profile => commands::gate::profile().await?,
        Commands::Favorite { title } => commands::interest::favorite(&title).await?,
        Commands::Unfavorite { title } => commands::interest::unfavorite(&title).await?,
        Commands::Compare { title } => commands::interest::compare(&title).await?,
        Commands::Inquire {
            title,
            project,
            email,
            name,
            phone,
        } => {
            commands::interest::inquire(
                &title,
                project.as_deref(),
                email.as_deref(),
                name.as_deref(),
                phone.as_deref(),
            )
            .await?;
        }
        Commands::Sync => commands::gate::sync().await?,
        Commands::Classify { title } => commands::interest::classify_title(&title),
    }
    Ok(())
}
