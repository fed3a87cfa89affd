//! RateStore CLI - Database migrations and account management.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! ratestore-cli migrate
//!
//! # Create an administrator
//! ratestore-cli admin create -n "Morgan Ellis Admin" -e admin@example.com -p 'Str0ng!pass'
//!
//! # Change a user's role
//! ratestore-cli user set-role -e owner@example.com -r store_owner
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ratestore-cli")]
#[command(author, version, about = "RateStore CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage administrator accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new administrator
    Create {
        /// Display name (5-60 characters)
        #[arg(short, long)]
        name: String,

        /// Login email address
        #[arg(short, long)]
        email: String,

        /// Password (8-16 characters, one uppercase, one of !@#$%^&*)
        #[arg(short, long)]
        password: String,

        /// Postal address
        #[arg(short, long)]
        address: Option<String>,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Change a user's role
    SetRole {
        /// Email of the user to change
        #[arg(short, long)]
        email: String,

        /// New role (`admin`, `user`, `store_owner`)
        #[arg(short, long)]
        role: String,
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
                name,
                email,
                password,
                address,
            } => {
                commands::admin::create_user(&name, &email, &password, address.as_deref()).await?;
            }
        },
        Commands::User { action } => match action {
            UserAction::SetRole { email, role } => {
                commands::user::set_role(&email, &role).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_set_role() {
        let cli = Cli::try_parse_from([
            "ratestore-cli",
            "user",
            "set-role",
            "--email",
            "owner@example.com",
            "--role",
            "store_owner",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::User {
                action: UserAction::SetRole { .. }
            })
        ));
    }
}
