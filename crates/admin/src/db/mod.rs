//! Database operations for the assignment `PostgreSQL` schema.
//!
//! # Schema: `desk`
//!
//! ## Tables
//!
//! - `admin_user` - Admins and their role (`super_admin` / `sub_admin`)
//! - `client` - Client accounts (written by the identity subsystem)
//! - `client_assignment` - Admin to client assignments, unique per client
//! - `session` - Session storage (tower-sessions)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p content-desk-cli -- migrate
//! ```

pub mod assignments;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use content_desk_core::ClientId;

pub use assignments::PgAssignmentStore;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx (connection, timeout, query failure).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested or referenced entity was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The client already has an assignment (unique constraint on `client_user_id`).
    #[error("client {0} is already assigned")]
    DuplicateAssignment(ClientId),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
