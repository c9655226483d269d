//! Assignment registry.
//!
//! Holds the caller's view of assignments, admins and unassigned clients.
//! The snapshot is only ever replaced wholesale by [`AssignmentRegistry::refresh`],
//! never patched in place. All writes to assignments go through the registry.
//!
//! When the refresh that follows a write fails, the registry marks itself
//! stale. A stale snapshot is not used to reject writes; the store's
//! constraints decide until the next successful refresh.

use serde::Serialize;
use tracing::{info, instrument, warn};

use content_desk_core::{AdminId, AdminRole, AssignmentId, ClientId};

use super::{AccessContext, AssignmentError};
use crate::db::RepositoryError;
use crate::models::{AdminSummary, Assignment, AssignmentRecord, Client, NewAssignment};
use crate::store::AssignmentStore;

/// The collections derived from the store on the last refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrySnapshot {
    pub assignments: Vec<AssignmentRecord>,
    /// Empty for sub-admin callers.
    pub admins: Vec<AdminSummary>,
    /// Empty for sub-admin callers.
    pub unassigned_clients: Vec<Client>,
}

/// In-memory reflection of the assignment store for one caller.
pub struct AssignmentRegistry<'a> {
    store: &'a dyn AssignmentStore,
    snapshot: RegistrySnapshot,
    stale: bool,
}

impl<'a> AssignmentRegistry<'a> {
    /// Create a registry with an empty snapshot.
    #[must_use]
    pub fn new(store: &'a dyn AssignmentStore) -> Self {
        Self {
            store,
            snapshot: RegistrySnapshot::default(),
            stale: false,
        }
    }

    /// Create a registry and load its first snapshot.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentError::Transport` if the store fails.
    pub async fn load(
        store: &'a dyn AssignmentStore,
        ctx: &AccessContext,
    ) -> Result<Self, AssignmentError> {
        let mut registry = Self::new(store);
        registry.refresh(ctx).await?;
        Ok(registry)
    }

    /// Current assignments visible to the caller.
    #[must_use]
    pub fn assignments(&self) -> &[AssignmentRecord] {
        &self.snapshot.assignments
    }

    /// All admins with assigned counts (super-admin callers only).
    #[must_use]
    pub fn admins(&self) -> &[AdminSummary] {
        &self.snapshot.admins
    }

    /// Clients without an assignment (super-admin callers only).
    #[must_use]
    pub fn unassigned_clients(&self) -> &[Client] {
        &self.snapshot.unassigned_clients
    }

    /// The whole current snapshot.
    #[must_use]
    pub const fn snapshot(&self) -> &RegistrySnapshot {
        &self.snapshot
    }

    /// Whether the snapshot may lag behind the store.
    ///
    /// Set when a refresh after a write fails, cleared by the next
    /// successful [`refresh`](Self::refresh).
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    /// Find the assignment linking `client_id` to `admin_id`.
    #[must_use]
    pub fn find_assignment(
        &self,
        admin_id: AdminId,
        client_id: ClientId,
    ) -> Option<&AssignmentRecord> {
        self.snapshot
            .assignments
            .iter()
            .find(|record| record.matches(admin_id, client_id))
    }

    /// Look up an admin in the snapshot.
    #[must_use]
    pub fn admin(&self, admin_id: AdminId) -> Option<&AdminSummary> {
        self.snapshot
            .admins
            .iter()
            .find(|summary| summary.admin.id == admin_id)
    }

    /// Re-derive the snapshot from the store.
    ///
    /// Super-admins get every assignment, every admin and every unassigned
    /// client; sub-admins get only their own assignments.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentError::Transport` if the store fails. The previous
    /// snapshot is kept in that case.
    #[instrument(skip(self, ctx), fields(admin_id = %ctx.admin_id()))]
    pub async fn refresh(&mut self, ctx: &AccessContext) -> Result<(), AssignmentError> {
        let snapshot = match ctx.role() {
            AdminRole::SuperAdmin => RegistrySnapshot {
                admins: self.store.list_admins().await.map_err(transport)?,
                assignments: self.store.list_assignments(None).await.map_err(transport)?,
                unassigned_clients: self
                    .store
                    .list_unassigned_clients()
                    .await
                    .map_err(transport)?,
            },
            AdminRole::SubAdmin => RegistrySnapshot {
                assignments: self
                    .store
                    .list_assignments(Some(ctx.admin_id()))
                    .await
                    .map_err(transport)?,
                ..RegistrySnapshot::default()
            },
        };

        self.snapshot = snapshot;
        self.stale = false;
        Ok(())
    }

    /// Assign a client to a sub-admin.
    ///
    /// Checks the snapshot first (target must be a known sub-admin, client
    /// must not already be assigned); the store's unique constraint remains
    /// the final word for races the snapshot cannot see. While the snapshot
    /// is stale only the role of a known target is checked here.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentError::Unauthorized` if the caller is not a super-admin.
    /// Returns `AssignmentError::NotFound` if the admin or client does not exist.
    /// Returns `AssignmentError::InvalidTarget` if the target is not a sub-admin.
    /// Returns `AssignmentError::DuplicateAssignment` if the client is already assigned.
    /// Returns `AssignmentError::Transport` if the store fails.
    #[instrument(skip(self, ctx), fields(caller = %ctx.admin_id()))]
    pub async fn assign(
        &mut self,
        ctx: &AccessContext,
        admin_id: AdminId,
        client_id: ClientId,
    ) -> Result<Assignment, AssignmentError> {
        ctx.require_assignment_manager("assign clients")?;

        match self.admin(admin_id) {
            Some(target) if !target.admin.role.accepts_assignments() => {
                return Err(AssignmentError::InvalidTarget(admin_id));
            }
            Some(_) => {}
            None if self.stale => {}
            None => return Err(AssignmentError::NotFound(format!("admin {admin_id}"))),
        }
        if !self.stale
            && self
                .snapshot
                .assignments
                .iter()
                .any(|record| record.assignment.client_user_id == client_id)
        {
            return Err(AssignmentError::DuplicateAssignment(client_id));
        }

        let assignment = self
            .store
            .create_assignment(NewAssignment {
                admin_id,
                client_id,
                assigned_by: ctx.admin_id(),
            })
            .await?;

        info!(
            assignment_id = %assignment.id,
            %admin_id,
            %client_id,
            "Client assigned"
        );

        self.refresh_after_write(ctx).await;
        Ok(assignment)
    }

    /// Remove an assignment by ID.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentError::Unauthorized` if the caller is not a super-admin.
    /// Returns `AssignmentError::AssignmentNotFound` if no such assignment exists.
    /// Returns `AssignmentError::Transport` if the store fails.
    #[instrument(skip(self, ctx), fields(caller = %ctx.admin_id()))]
    pub async fn unassign(
        &mut self,
        ctx: &AccessContext,
        assignment_id: AssignmentId,
    ) -> Result<(), AssignmentError> {
        ctx.require_assignment_manager("unassign clients")?;

        self.store
            .delete_assignment(assignment_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound(what) => AssignmentError::AssignmentNotFound(what),
                other => other.into(),
            })?;

        info!(%assignment_id, "Client unassigned");

        self.refresh_after_write(ctx).await;
        Ok(())
    }

    /// Refresh after a successful write.
    ///
    /// The write already happened, so a failed refresh is logged and the
    /// snapshot marked stale rather than reporting the write as failed.
    pub(crate) async fn refresh_after_write(&mut self, ctx: &AccessContext) {
        if let Err(e) = self.refresh(ctx).await {
            warn!(error = %e, "Refresh after assignment change failed; snapshot is stale");
            self.stale = true;
        }
    }
}

fn transport(err: RepositoryError) -> AssignmentError {
    AssignmentError::Transport(err)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use content_desk_core::Email;

    use super::*;
    use crate::models::Admin;
    use crate::services::resolve_access;
    use crate::store::MemoryAssignmentStore;

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    struct Fixture {
        store: MemoryAssignmentStore,
        boss: Admin,
        sub1: Admin,
        sub2: Admin,
        client_a: Client,
    }

    fn fixture() -> Fixture {
        let store = MemoryAssignmentStore::new();
        let boss = store.insert_admin(email("super@x.com"), AdminRole::SuperAdmin);
        let sub1 = store.insert_admin(email("sub1@x.com"), AdminRole::SubAdmin);
        let sub2 = store.insert_admin(email("sub2@x.com"), AdminRole::SubAdmin);
        let client_a = store.insert_client(email("a@acme.com"), "Acme");
        Fixture {
            store,
            boss,
            sub1,
            sub2,
            client_a,
        }
    }

    #[tokio::test]
    async fn test_assign_updates_snapshot() {
        let f = fixture();
        let ctx = resolve_access(&f.store, f.boss.user_id).await.unwrap();
        let mut registry = AssignmentRegistry::load(&f.store, &ctx).await.unwrap();
        assert_eq!(registry.unassigned_clients().len(), 1);

        let assignment = registry.assign(&ctx, f.sub1.id, f.client_a.id).await.unwrap();

        assert_eq!(assignment.assigned_by, f.boss.id);
        assert!(registry.unassigned_clients().is_empty());
        assert!(registry.find_assignment(f.sub1.id, f.client_a.id).is_some());
        assert_eq!(registry.admin(f.sub1.id).unwrap().assigned_count, 1);
    }

    #[tokio::test]
    async fn test_assign_rejects_duplicate_without_touching_store() {
        let f = fixture();
        let ctx = resolve_access(&f.store, f.boss.user_id).await.unwrap();
        let mut registry = AssignmentRegistry::load(&f.store, &ctx).await.unwrap();
        registry.assign(&ctx, f.sub1.id, f.client_a.id).await.unwrap();

        let err = registry
            .assign(&ctx, f.sub2.id, f.client_a.id)
            .await
            .unwrap_err();

        assert!(matches!(err, AssignmentError::DuplicateAssignment(id) if id == f.client_a.id));
        assert_eq!(f.store.assignment_count(), 1);
        assert!(registry.find_assignment(f.sub1.id, f.client_a.id).is_some());
    }

    #[tokio::test]
    async fn test_store_constraint_catches_stale_snapshot() {
        let f = fixture();
        let ctx = resolve_access(&f.store, f.boss.user_id).await.unwrap();
        let mut stale = AssignmentRegistry::load(&f.store, &ctx).await.unwrap();
        let mut fresh = AssignmentRegistry::load(&f.store, &ctx).await.unwrap();
        fresh.assign(&ctx, f.sub1.id, f.client_a.id).await.unwrap();

        let err = stale
            .assign(&ctx, f.sub2.id, f.client_a.id)
            .await
            .unwrap_err();

        assert!(matches!(err, AssignmentError::DuplicateAssignment(_)));
        assert_eq!(f.store.assignment_count(), 1);
    }

    #[tokio::test]
    async fn test_assign_to_super_admin_is_invalid() {
        let f = fixture();
        let ctx = resolve_access(&f.store, f.boss.user_id).await.unwrap();
        let mut registry = AssignmentRegistry::load(&f.store, &ctx).await.unwrap();

        let err = registry
            .assign(&ctx, f.boss.id, f.client_a.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AssignmentError::InvalidTarget(id) if id == f.boss.id));

        let err = registry
            .assign(&ctx, AdminId::generate(), f.client_a.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AssignmentError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_assign_unknown_client_is_not_found() {
        let f = fixture();
        let ctx = resolve_access(&f.store, f.boss.user_id).await.unwrap();
        let mut registry = AssignmentRegistry::load(&f.store, &ctx).await.unwrap();

        let err = registry
            .assign(&ctx, f.sub1.id, ClientId::generate())
            .await
            .unwrap_err();
        assert!(matches!(err, AssignmentError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_sub_admin_cannot_mutate() {
        let f = fixture();
        let ctx = resolve_access(&f.store, f.sub1.user_id).await.unwrap();
        let mut registry = AssignmentRegistry::load(&f.store, &ctx).await.unwrap();

        let err = registry
            .assign(&ctx, f.sub1.id, f.client_a.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AssignmentError::Unauthorized(_)));

        let err = registry
            .unassign(&ctx, AssignmentId::generate())
            .await
            .unwrap_err();
        assert!(matches!(err, AssignmentError::Unauthorized(_)));
        assert_eq!(f.store.assignment_count(), 0);
    }

    #[tokio::test]
    async fn test_sub_admin_snapshot_is_scoped() {
        let f = fixture();
        let boss = resolve_access(&f.store, f.boss.user_id).await.unwrap();
        AssignmentRegistry::load(&f.store, &boss)
            .await
            .unwrap()
            .assign(&boss, f.sub1.id, f.client_a.id)
            .await
            .unwrap();

        let sub1 = resolve_access(&f.store, f.sub1.user_id).await.unwrap();
        let registry = AssignmentRegistry::load(&f.store, &sub1).await.unwrap();
        assert_eq!(registry.assignments().len(), 1);
        assert!(registry.admins().is_empty());
        assert!(registry.unassigned_clients().is_empty());

        let sub2 = resolve_access(&f.store, f.sub2.user_id).await.unwrap();
        let registry = AssignmentRegistry::load(&f.store, &sub2).await.unwrap();
        assert!(registry.assignments().is_empty());
    }

    #[tokio::test]
    async fn test_unassign_missing_row() {
        let f = fixture();
        let ctx = resolve_access(&f.store, f.boss.user_id).await.unwrap();
        let mut registry = AssignmentRegistry::load(&f.store, &ctx).await.unwrap();

        let err = registry
            .unassign(&ctx, AssignmentId::generate())
            .await
            .unwrap_err();
        assert!(matches!(err, AssignmentError::AssignmentNotFound(_)));
    }

    #[tokio::test]
    async fn test_refresh_is_idempotent() {
        let f = fixture();
        let ctx = resolve_access(&f.store, f.boss.user_id).await.unwrap();
        let mut registry = AssignmentRegistry::load(&f.store, &ctx).await.unwrap();
        registry.assign(&ctx, f.sub1.id, f.client_a.id).await.unwrap();

        registry.refresh(&ctx).await.unwrap();
        let first = serde_json::to_string(registry.snapshot()).unwrap();
        registry.refresh(&ctx).await.unwrap();
        let second = serde_json::to_string(registry.snapshot()).unwrap();

        assert_eq!(first, second);
    }
}
