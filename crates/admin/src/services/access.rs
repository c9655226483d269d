//! Access policy resolution.
//!
//! Maps an authenticated identity to the admin's role and the set of clients
//! the admin may see. The result is an [`AccessContext`] that every registry
//! and bulk operation takes explicitly.

use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use content_desk_core::{AdminId, AdminRole, ClientId, UserId};

use super::AssignmentError;
use crate::db::RepositoryError;
use crate::models::Admin;
use crate::store::AssignmentStore;

/// Errors that can occur while resolving access.
///
/// Both variants mean "deny".
#[derive(Debug, Error)]
pub enum AccessError {
    /// The identity has no admin record.
    #[error("user {0} is not an admin")]
    NotAdmin(UserId),

    /// The store failed while resolving access.
    #[error("access resolution failed: {0}")]
    ResolutionFailed(#[source] RepositoryError),
}

/// Which clients an admin may see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum ClientVisibility {
    /// Every client (super-admins).
    All,
    /// Exactly these clients (sub-admins).
    Only { client_ids: BTreeSet<ClientId> },
}

/// Resolved role and visibility of the calling admin.
///
/// Only obtainable through [`resolve_access`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessContext {
    admin: Admin,
    visibility: ClientVisibility,
}

impl AccessContext {
    /// The calling admin.
    #[must_use]
    pub const fn admin(&self) -> &Admin {
        &self.admin
    }

    /// The calling admin's ID.
    #[must_use]
    pub const fn admin_id(&self) -> AdminId {
        self.admin.id
    }

    /// The calling admin's role.
    #[must_use]
    pub const fn role(&self) -> AdminRole {
        self.admin.role
    }

    /// The calling admin's client visibility.
    #[must_use]
    pub const fn visibility(&self) -> &ClientVisibility {
        &self.visibility
    }

    /// Visible client IDs, or `None` when visibility is unbounded.
    #[must_use]
    pub const fn visible_client_ids(&self) -> Option<&BTreeSet<ClientId>> {
        match &self.visibility {
            ClientVisibility::All => None,
            ClientVisibility::Only { client_ids } => Some(client_ids),
        }
    }

    /// Whether the caller may see the given client.
    #[must_use]
    pub fn can_view(&self, client_id: ClientId) -> bool {
        match &self.visibility {
            ClientVisibility::All => true,
            ClientVisibility::Only { client_ids } => client_ids.contains(&client_id),
        }
    }

    /// Require a role that may change assignments.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentError::Unauthorized` naming the attempted action.
    pub fn require_assignment_manager(&self, action: &str) -> Result<(), AssignmentError> {
        if self.role().can_manage_assignments() {
            return Ok(());
        }
        tracing::warn!(
            admin_id = %self.admin.id,
            role = %self.admin.role,
            action,
            "Rejected assignment mutation"
        );
        Err(AssignmentError::Unauthorized(format!(
            "{} may not {action}",
            self.admin.role
        )))
    }
}

/// Resolve the access context for an authenticated user.
///
/// # Errors
///
/// Returns `AccessError::NotAdmin` if the user has no admin record.
/// Returns `AccessError::ResolutionFailed` if the store fails.
#[instrument(skip(store))]
pub async fn resolve_access(
    store: &dyn AssignmentStore,
    user_id: UserId,
) -> Result<AccessContext, AccessError> {
    let admin = store
        .find_admin_by_user(user_id)
        .await
        .map_err(AccessError::ResolutionFailed)?
        .ok_or(AccessError::NotAdmin(user_id))?;

    let visibility = match admin.role {
        AdminRole::SuperAdmin => ClientVisibility::All,
        AdminRole::SubAdmin => {
            let client_ids = store
                .list_assignments(Some(admin.id))
                .await
                .map_err(AccessError::ResolutionFailed)?
                .into_iter()
                .map(|record| record.assignment.client_user_id)
                .collect();
            ClientVisibility::Only { client_ids }
        }
    };

    tracing::debug!(admin_id = %admin.id, role = %admin.role, "Resolved admin access");

    Ok(AccessContext { admin, visibility })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;

    use content_desk_core::{AssignmentId, Email};

    use super::*;
    use crate::models::{AdminSummary, Assignment, AssignmentRecord, Client, NewAssignment};
    use crate::store::MemoryAssignmentStore;

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_non_admin_is_denied() {
        let store = MemoryAssignmentStore::new();
        let user_id = UserId::generate();
        let err = resolve_access(&store, user_id).await.unwrap_err();
        assert!(matches!(err, AccessError::NotAdmin(id) if id == user_id));
    }

    #[tokio::test]
    async fn test_super_admin_sees_everything() {
        let store = MemoryAssignmentStore::new();
        let boss = store.insert_admin(email("super@x.com"), AdminRole::SuperAdmin);

        let ctx = resolve_access(&store, boss.user_id).await.unwrap();

        assert_eq!(ctx.role(), AdminRole::SuperAdmin);
        assert_eq!(ctx.visibility(), &ClientVisibility::All);
        assert!(ctx.visible_client_ids().is_none());
        assert!(ctx.can_view(ClientId::generate()));
        assert!(ctx.require_assignment_manager("assign clients").is_ok());
    }

    #[tokio::test]
    async fn test_sub_admin_without_assignments_sees_nothing() {
        let store = MemoryAssignmentStore::new();
        let sub = store.insert_admin(email("sub1@x.com"), AdminRole::SubAdmin);
        let client = store.insert_client(email("a@acme.com"), "Acme");

        let ctx = resolve_access(&store, sub.user_id).await.unwrap();

        assert_eq!(ctx.visible_client_ids(), Some(&BTreeSet::new()));
        assert!(!ctx.can_view(client.id));
        assert!(matches!(
            ctx.require_assignment_manager("assign clients"),
            Err(AssignmentError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_sub_admin_sees_only_assigned_clients() {
        let store = MemoryAssignmentStore::new();
        let boss = store.insert_admin(email("super@x.com"), AdminRole::SuperAdmin);
        let sub = store.insert_admin(email("sub1@x.com"), AdminRole::SubAdmin);
        let mine = store.insert_client(email("a@acme.com"), "Acme");
        let theirs = store.insert_client(email("b@globex.com"), "Globex");
        store
            .create_assignment(NewAssignment {
                admin_id: sub.id,
                client_id: mine.id,
                assigned_by: boss.id,
            })
            .await
            .unwrap();

        let ctx = resolve_access(&store, sub.user_id).await.unwrap();

        assert!(ctx.can_view(mine.id));
        assert!(!ctx.can_view(theirs.id));
        assert_eq!(ctx.visible_client_ids().unwrap().len(), 1);
    }

    struct UnreachableStore;

    #[async_trait]
    impl AssignmentStore for UnreachableStore {
        async fn list_admins(&self) -> Result<Vec<AdminSummary>, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn find_admin_by_user(&self, _: UserId) -> Result<Option<Admin>, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn list_assignments(
            &self,
            _: Option<AdminId>,
        ) -> Result<Vec<AssignmentRecord>, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn list_unassigned_clients(&self) -> Result<Vec<Client>, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn create_assignment(&self, _: NewAssignment) -> Result<Assignment, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn delete_assignment(&self, _: AssignmentId) -> Result<(), RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    #[tokio::test]
    async fn test_store_failure_denies() {
        let err = resolve_access(&UnreachableStore, UserId::generate())
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::ResolutionFailed(_)));
    }
}
