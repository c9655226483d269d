//! CLI subcommand implementations.

pub mod admin;
pub mod migrate;

use thiserror::Error;

/// Error for a missing database URL.
#[derive(Debug, Error)]
#[error("Missing environment variable: DESK_DATABASE_URL (or DATABASE_URL)")]
pub struct MissingDatabaseUrl;

/// Read the database URL, falling back to `DATABASE_URL`.
///
/// # Errors
///
/// Returns `MissingDatabaseUrl` if neither variable is set.
pub fn database_url() -> Result<String, MissingDatabaseUrl> {
    dotenvy::dotenv().ok();

    std::env::var("DESK_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| MissingDatabaseUrl)
}
