//! Integration tests for Content Desk.
//!
//! # Running Tests
//!
//! ```bash
//! # Engine scenarios (in-memory store, no services needed)
//! cargo test -p content-desk-integration-tests
//!
//! # Including tests against PostgreSQL and a running server
//! cargo test -p content-desk-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `assignment_engine` - Access, registry and bulk scenarios
//! - `pg_store` - `PostgreSQL` store constraint mapping (ignored by default)
//! - `admin_api` - HTTP smoke tests against a running server (ignored by default)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use content_desk_admin::db::RepositoryError;
use content_desk_admin::models::{
    Admin, AdminSummary, Assignment, AssignmentRecord, Client, NewAssignment,
};
use content_desk_admin::services::{AccessContext, resolve_access};
use content_desk_admin::store::{AssignmentStore, MemoryAssignmentStore};
use content_desk_core::{AdminId, AdminRole, AssignmentId, Email, UserId};

/// One super-admin, two sub-admins and a handful of clients.
pub struct World {
    pub store: Arc<MemoryAssignmentStore>,
    pub boss: Admin,
    pub sub1: Admin,
    pub sub2: Admin,
    pub clients: Vec<Client>,
}

impl World {
    /// Build a world with `clients` unassigned clients.
    ///
    /// # Panics
    ///
    /// Panics if a fixture email is invalid.
    #[must_use]
    pub fn new(clients: usize) -> Self {
        let store = Arc::new(MemoryAssignmentStore::new());
        let boss = store.insert_admin(email("super@desk.test"), AdminRole::SuperAdmin);
        let sub1 = store.insert_admin(email("sub1@desk.test"), AdminRole::SubAdmin);
        let sub2 = store.insert_admin(email("sub2@desk.test"), AdminRole::SubAdmin);
        let clients = (0..clients)
            .map(|i| store.insert_client(email(&format!("client{i}@acme.test")), "Acme"))
            .collect();

        Self {
            store,
            boss,
            sub1,
            sub2,
            clients,
        }
    }

    /// Resolve the access context for one of the world's admins.
    ///
    /// # Panics
    ///
    /// Panics if the admin is not in the store.
    pub async fn access(&self, admin: &Admin) -> AccessContext {
        resolve_access(self.store.as_ref(), admin.user_id)
            .await
            .unwrap_or_else(|e| panic!("fixture admin {} has no access: {e}", admin.email))
    }
}

/// Parse a fixture email.
///
/// # Panics
///
/// Panics if the email is invalid.
#[must_use]
pub fn email(s: &str) -> Email {
    Email::parse(s).unwrap_or_else(|e| panic!("invalid fixture email {s}: {e}"))
}

/// Store wrapper that injects failures into an inner store.
pub struct FaultyStore {
    inner: Arc<MemoryAssignmentStore>,
    fail_creates_for: Mutex<Option<AdminId>>,
    fail_reads: AtomicBool,
}

impl FaultyStore {
    #[must_use]
    pub fn new(inner: Arc<MemoryAssignmentStore>) -> Self {
        Self {
            inner,
            fail_creates_for: Mutex::new(None),
            fail_reads: AtomicBool::new(false),
        }
    }

    /// Fail every `create_assignment` targeting this admin.
    pub fn fail_creates_for(&self, admin_id: AdminId) {
        *self
            .fail_creates_for
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(admin_id);
    }

    /// Fail (or stop failing) every list operation.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn check_reads(&self) -> Result<(), RepositoryError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl AssignmentStore for FaultyStore {
    async fn list_admins(&self) -> Result<Vec<AdminSummary>, RepositoryError> {
        self.check_reads()?;
        self.inner.list_admins().await
    }

    async fn find_admin_by_user(&self, user_id: UserId) -> Result<Option<Admin>, RepositoryError> {
        self.inner.find_admin_by_user(user_id).await
    }

    async fn list_assignments(
        &self,
        admin_id: Option<AdminId>,
    ) -> Result<Vec<AssignmentRecord>, RepositoryError> {
        self.check_reads()?;
        self.inner.list_assignments(admin_id).await
    }

    async fn list_unassigned_clients(&self) -> Result<Vec<Client>, RepositoryError> {
        self.check_reads()?;
        self.inner.list_unassigned_clients().await
    }

    async fn create_assignment(&self, new: NewAssignment) -> Result<Assignment, RepositoryError> {
        let failing = *self
            .fail_creates_for
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if failing == Some(new.admin_id) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        self.inner.create_assignment(new).await
    }

    async fn delete_assignment(&self, id: AssignmentId) -> Result<(), RepositoryError> {
        self.inner.delete_assignment(id).await
    }
}
