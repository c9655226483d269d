//! The assignment store boundary.
//!
//! Every primitive is one round trip to the backing store and reports
//! failures as [`RepositoryError`] values. The store enforces its own
//! constraints (unique client, referenced admin/client must exist) and no
//! business rules beyond them.
//!
//! Implementations:
//! - [`crate::db::PgAssignmentStore`] - `PostgreSQL` (`desk` schema)
//! - [`MemoryAssignmentStore`] - in-process, for tests and local experiments

pub mod memory;

use async_trait::async_trait;

use content_desk_core::{AdminId, AssignmentId, UserId};

use crate::db::RepositoryError;
use crate::models::{Admin, AdminSummary, Assignment, AssignmentRecord, Client, NewAssignment};

pub use memory::MemoryAssignmentStore;

/// Primitive operations against the assignment store.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// List every admin with its current assigned-client count.
    async fn list_admins(&self) -> Result<Vec<AdminSummary>, RepositoryError>;

    /// Find the admin record belonging to an authenticated user, if any.
    async fn find_admin_by_user(&self, user_id: UserId) -> Result<Option<Admin>, RepositoryError>;

    /// List assignments joined with client details, optionally for one admin.
    ///
    /// Ordered by `assigned_at`, then assignment ID.
    async fn list_assignments(
        &self,
        admin_id: Option<AdminId>,
    ) -> Result<Vec<AssignmentRecord>, RepositoryError>;

    /// List clients that have no assignment, ordered by company then email.
    async fn list_unassigned_clients(&self) -> Result<Vec<Client>, RepositoryError>;

    /// Insert an assignment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DuplicateAssignment` if the client is already assigned.
    /// Returns `RepositoryError::NotFound` if the admin or client does not exist.
    async fn create_assignment(&self, new: NewAssignment) -> Result<Assignment, RepositoryError>;

    /// Delete an assignment by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such assignment exists.
    async fn delete_assignment(&self, id: AssignmentId) -> Result<(), RepositoryError>;
}
