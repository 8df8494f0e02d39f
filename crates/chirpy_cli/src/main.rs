//! Chirpy CLI
//!
//! Command-line tools for managing a Chirpy store file.
//!
//! # Commands
//!
//! - `init` - Create an empty store
//! - `inspect` - Display store contents and statistics
//! - `verify` - Check store integrity
//! - `create-user` - Register a user
//! - `issue-tokens` - Log in and print a fresh token pair
//! - `revoke` - Revoke a refresh token
//! - `upgrade` - Deliver a payment webhook event

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Chirpy command-line store tools.
#[derive(Parser)]
#[command(name = "chirpy")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store file
    #[arg(
        global = true,
        short,
        long,
        env = "CHIRPY_DB",
        default_value = "./database/database.json"
    )]
    path: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty store if none exists
    Init,

    /// Display store contents and statistics
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Verify store integrity
    Verify,

    /// Register a new user
    CreateUser {
        /// Email address
        #[arg(long)]
        email: String,

        /// Plaintext password
        #[arg(long)]
        password: String,
    },

    /// Log in and print an access and refresh token
    IssueTokens {
        /// Email address
        #[arg(long)]
        email: String,

        /// Plaintext password
        #[arg(long)]
        password: String,

        /// Token signing secret
        #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
        jwt_secret: String,
    },

    /// Revoke a refresh token
    Revoke {
        /// The refresh token
        #[arg(long)]
        token: String,
    },

    /// Deliver a payment webhook event
    Upgrade {
        /// User to upgrade
        #[arg(long)]
        user_id: u64,

        /// Key presented by the caller
        #[arg(long)]
        api_key: String,

        /// Webhook event name
        #[arg(long, default_value = chirpy_auth::USER_UPGRADED)]
        event: String,

        /// Key the caller must present
        #[arg(long, env = "POLKA_API_KEY", hide_env_values = true)]
        polka_key: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Init => commands::init::run(&cli.path)?,
        Commands::Inspect { format } => commands::inspect::run(&cli.path, &format)?,
        Commands::Verify => commands::verify::run(&cli.path)?,
        Commands::CreateUser { email, password } => {
            commands::user::run(&cli.path, &email, &password)?;
        }
        Commands::IssueTokens {
            email,
            password,
            jwt_secret,
        } => commands::tokens::issue(&cli.path, &email, &password, &jwt_secret)?,
        Commands::Revoke { token } => commands::tokens::revoke(&cli.path, &token)?,
        Commands::Upgrade {
            user_id,
            api_key,
            event,
            polka_key,
        } => commands::upgrade::run(&cli.path, user_id, &api_key, &event, &polka_key)?,
        Commands::Version => {
            println!("Chirpy CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Chirpy Core v{}", chirpy_core::VERSION);
        }
    }

    Ok(())
}
