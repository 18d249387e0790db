//! Cartwright CLI - Database migrations and cart inspection tools.
//!
//! # Usage
//!
//! ```bash
//! # Run cart database migrations
//! cartwright-cli migrate
//!
//! # Print a stored cart as JSON
//! cartwright-cli cart show 6f1c2a4e-8d0b-4a53-9a57-2f6f0d2b1c11
//!
//! # Delete a registered user's carts on a site
//! cartwright-cli cart delete-user-cart --user-id 42 --site-id 1
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `cart show` - Print a cart record
//! - `cart delete-user-cart` - Remove the carts a user owns on a site

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cartwright_core::{CartGuid, SiteId, UserId};

mod commands;

#[derive(Parser)]
#[command(name = "cartwright-cli")]
#[command(author, version, about = "Cartwright CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run cart database migrations
    Migrate,
    /// Inspect and maintain stored carts
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Print a cart as JSON
    Show {
        /// Cart GUID
        guid: CartGuid,
    },
    /// Delete every cart a registered user owns on a site
    DeleteUserCart {
        /// User ID
        #[arg(short, long)]
        user_id: i32,

        /// Site ID
        #[arg(short, long)]
        site_id: i32,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cartwright_cart=info,cartwright_cli=info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Cart { action } => match action {
            CartAction::Show { guid } => commands::cart::show(guid).await?,
            CartAction::DeleteUserCart { user_id, site_id } => {
                commands::cart::delete_user_cart(UserId::new(user_id), SiteId::new(site_id))
                    .await?;
            }
        },
    }
    Ok(())
}
