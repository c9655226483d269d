//! Admin management commands.
//!
//! # Usage
//!
//! ```bash
//! # Register an existing user as a sub-admin
//! desk-cli admin create -u 67e55044-10b1-426f-9247-bb680e5fe0c8 -e sub@example.com -r sub_admin
//!
//! # List admins and their assigned-client counts
//! desk-cli admin list
//! ```
//!
//! # Environment Variables
//!
//! - `DESK_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use sqlx::PgPool;
use thiserror::Error;

use content_desk_admin::db::{PgAssignmentStore, RepositoryError};
use content_desk_admin::store::AssignmentStore;
use content_desk_core::{AdminId, AdminRole, Email, EmailError, UserId};

use super::{MissingDatabaseUrl, database_url};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    MissingEnvVar(#[from] MissingDatabaseUrl),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store error: {0}")]
    Store(#[from] RepositoryError),

    #[error("Invalid role: {0}. Valid roles: super_admin, sub_admin")]
    InvalidRole(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid user ID: {0}")]
    InvalidUserId(String),

    #[error("Admin already exists for user or email: {0}")]
    AdminExists(String),
}

/// Validated arguments for `admin create`.
#[derive(Debug, PartialEq, Eq)]
struct NewAdmin {
    user_id: UserId,
    email: Email,
    role: AdminRole,
}

fn parse_new_admin(user_id: &str, email: &str, role: &str) -> Result<NewAdmin, AdminError> {
    let user_id = user_id
        .trim()
        .parse()
        .map_err(|_| AdminError::InvalidUserId(user_id.to_owned()))?;
    let email = Email::parse(email)?;
    let role = role
        .parse()
        .map_err(|_| AdminError::InvalidRole(role.to_owned()))?;

    Ok(NewAdmin {
        user_id,
        email,
        role,
    })
}

/// Register an authenticated user as an admin.
///
/// # Errors
///
/// Returns `AdminError` if the arguments are invalid, the database is
/// unreachable, or the user or email is already registered.
pub async fn create(user_id: &str, email: &str, role: &str) -> Result<AdminId, AdminError> {
    let new = parse_new_admin(user_id, email, role)?;

    let pool = PgPool::connect(&database_url()?).await?;

    tracing::info!("Creating admin: {} ({})", new.email, new.role);

    let admin_id = sqlx::query_scalar::<_, AdminId>(
        r"
        INSERT INTO desk.admin_user (user_id, email, role)
        VALUES ($1, $2, $3)
        RETURNING id
        ",
    )
    .bind(new.user_id)
    .bind(new.email.as_str())
    .bind(new.role)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        let duplicate =
            matches!(&e, sqlx::Error::Database(db_err) if db_err.is_unique_violation());
        if duplicate {
            AdminError::AdminExists(new.email.to_string())
        } else {
            AdminError::Database(e)
        }
    })?;

    tracing::info!(
        "Admin created successfully! ID: {}, Email: {}, Role: {}",
        admin_id,
        new.email,
        new.role
    );

    Ok(admin_id)
}

/// Print every admin with its assigned-client count.
///
/// # Errors
///
/// Returns `AdminError` if the database is unreachable.
pub async fn list() -> Result<(), AdminError> {
    let pool = PgPool::connect(&database_url()?).await?;
    let store = PgAssignmentStore::new(pool);

    let admins = store.list_admins().await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{:<36}  {:<11}  {:>7}  EMAIL", "ID", "ROLE", "CLIENTS");
        for summary in &admins {
            println!(
                "{:<36}  {:<11}  {:>7}  {}",
                summary.admin.id, summary.admin.role, summary.assigned_count, summary.admin.email
            );
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const USER: &str = "67e55044-10b1-426f-9247-bb680e5fe0c8";

    #[test]
    fn test_parse_new_admin() {
        let new = parse_new_admin(USER, " Sub@Example.com ", "sub_admin").unwrap();
        assert_eq!(new.user_id.to_string(), USER);
        assert_eq!(new.email.as_str(), "sub@example.com");
        assert_eq!(new.role, AdminRole::SubAdmin);
    }

    #[test]
    fn test_parse_new_admin_rejects_bad_input() {
        assert!(matches!(
            parse_new_admin("not-a-uuid", "a@b.com", "sub_admin"),
            Err(AdminError::InvalidUserId(_))
        ));
        assert!(matches!(
            parse_new_admin(USER, "nobody", "sub_admin"),
            Err(AdminError::InvalidEmail(_))
        ));
        assert!(matches!(
            parse_new_admin(USER, "a@b.com", "viewer"),
            Err(AdminError::InvalidRole(_))
        ));
    }
}
