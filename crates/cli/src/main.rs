//! Marketplace CLI - terminal front end for the marketplace backend.
//!
//! # Usage
//!
//! ```bash
//! # Browse the public listing
//! mp-cli products --page 2
//! mp-cli browse
//!
//! # Accounts
//! mp-cli signup --first-name Noa --last-name Levi --address "12 Herzl St, Haifa" \
//!     --email noa@example.com --password '...'
//! mp-cli login -e noa@example.com -p '...'
//! mp-cli logout
//!
//! # Your own products
//! mp-cli dashboard
//! mp-cli add --name Lamp --description "Brass desk lamp" --price 49.90 --quantity 2 \
//!     --image lamp.png
//! mp-cli delete 17
//! ```
//!
//! Configuration comes from `MARKETPLACE_*` environment variables (see
//! `marketplace_client::config`). Logging is controlled with `RUST_LOG`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use marketplace_core::ProductId;
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "mp-cli")]
#[command(author, version, about = "Marketplace client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one page of the product listing
    Products {
        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Page through the listing interactively (n = next, p = previous, q = quit)
    Browse,
    /// Log in and remember the session
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Signup {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        /// Full street address
        #[arg(long)]
        address: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// List your own products
    Dashboard,
    /// Add a product
    Add {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long)]
        price: String,

        #[arg(long)]
        quantity: String,

        /// Image file to upload
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Delete one of your products
    Delete {
        /// Product id
        id: i32,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = commands::Context::from_env()?;

    match cli.command {
        Commands::Products { page } => commands::listing::show(&ctx, page).await,
        Commands::Browse => commands::listing::browse(&ctx).await?,
        Commands::Login { email, password } => {
            commands::auth::login(&ctx, email, password).await;
        }
        Commands::Signup {
            first_name,
            last_name,
            address,
            email,
            password,
        } => {
            commands::auth::signup(
                &ctx,
                commands::auth::SignupArgs {
                    first_name,
                    last_name,
                    address,
                    email,
                    password,
                },
            )
            .await;
        }
        Commands::Logout => commands::auth::logout(&ctx)?,
        Commands::Dashboard => commands::dashboard::show(&ctx).await,
        Commands::Add {
            name,
            description,
            price,
            quantity,
            image,
        } => {
            commands::dashboard::add(
                &ctx,
                commands::dashboard::AddArgs {
                    name,
                    description,
                    price,
                    quantity,
                    image,
                },
            )
            .await?;
        }
        Commands::Delete { id } => {
            commands::dashboard::delete(&ctx, ProductId::new(id)).await;
        }
    }
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
