//! Content Desk CLI - Database migrations and admin management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! desk-cli migrate
//!
//! # Register a user as an admin
//! desk-cli admin create -u <user-id> -e admin@example.com -r super_admin
//!
//! # List admins
//! desk-cli admin list
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "desk-cli")]
#[command(author, version, about = "Content Desk CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admins
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Register an authenticated user as an admin
    Create {
        /// User ID issued by the identity provider
        #[arg(short, long)]
        user_id: String,

        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin role (`super_admin`, `sub_admin`)
        #[arg(short, long, default_value = "sub_admin")]
        role: String,
    },
    /// List admins with their assigned-client counts
    List,
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

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                user_id,
                email,
                role,
            } => {
                commands::admin::create(&user_id, &email, &role).await?;
            }
            AdminAction::List => commands::admin::list().await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_admin_create_defaults_to_sub_admin() {
        let cli = Cli::try_parse_from([
            "desk-cli",
            "admin",
            "create",
            "-u",
            "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "-e",
            "sub@example.com",
        ])
        .map_err(|e| e.to_string());

        assert!(matches!(
            cli,
            Ok(Cli {
                command: Commands::Admin {
                    action: AdminAction::Create { ref role, .. }
                }
            }) if role == "sub_admin"
        ));
    }
}
