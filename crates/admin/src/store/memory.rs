//! In-memory assignment store.
//!
//! Mirrors the `PostgreSQL` store's constraints and ordering so engine tests
//! exercise the same contract without a database.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use content_desk_core::{AdminId, AdminRole, AssignmentId, ClientId, Email, UserId};

use super::AssignmentStore;
use crate::db::RepositoryError;
use crate::models::{Admin, AdminSummary, Assignment, AssignmentRecord, Client, NewAssignment};

#[derive(Debug, Default)]
struct Tables {
    admins: Vec<Admin>,
    clients: Vec<Client>,
    assignments: Vec<Assignment>,
}

/// Assignment store held in process memory.
#[derive(Debug, Default)]
pub struct MemoryAssignmentStore {
    tables: Mutex<Tables>,
}

impl MemoryAssignmentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert an admin with a fresh identity and return it.
    pub fn insert_admin(&self, email: Email, role: AdminRole) -> Admin {
        let admin = Admin {
            id: AdminId::generate(),
            user_id: UserId::generate(),
            email,
            role,
            created_at: Utc::now(),
        };
        self.tables().admins.push(admin.clone());
        admin
    }

    /// Insert a client and return it.
    pub fn insert_client(&self, email: Email, company: &str) -> Client {
        let client = Client {
            id: ClientId::generate(),
            email,
            company: company.to_owned(),
        };
        self.tables().clients.push(client.clone());
        client
    }

    /// Number of assignments currently stored.
    #[must_use]
    pub fn assignment_count(&self) -> usize {
        self.tables().assignments.len()
    }
}

impl Tables {
    fn record(&self, assignment: &Assignment) -> Result<AssignmentRecord, RepositoryError> {
        let client = self
            .clients
            .iter()
            .find(|c| c.id == assignment.client_user_id)
            .ok_or_else(|| {
                RepositoryError::DataCorruption(format!(
                    "assignment {} references missing client {}",
                    assignment.id, assignment.client_user_id
                ))
            })?;

        Ok(AssignmentRecord {
            assignment: assignment.clone(),
            client_email: client.email.clone(),
            client_company: client.company.clone(),
        })
    }

    fn admin_exists(&self, id: AdminId) -> bool {
        self.admins.iter().any(|a| a.id == id)
    }
}

#[async_trait]
impl AssignmentStore for MemoryAssignmentStore {
    async fn list_admins(&self) -> Result<Vec<AdminSummary>, RepositoryError> {
        let tables = self.tables();
        let mut admins: Vec<AdminSummary> = tables
            .admins
            .iter()
            .map(|admin| AdminSummary {
                admin: admin.clone(),
                assigned_count: tables
                    .assignments
                    .iter()
                    .filter(|a| a.admin_id == admin.id)
                    .count()
                    .try_into()
                    .unwrap_or(i64::MAX),
            })
            .collect();
        admins.sort_by(|a, b| {
            (a.admin.created_at, a.admin.id).cmp(&(b.admin.created_at, b.admin.id))
        });
        Ok(admins)
    }

    async fn find_admin_by_user(&self, user_id: UserId) -> Result<Option<Admin>, RepositoryError> {
        Ok(self
            .tables()
            .admins
            .iter()
            .find(|a| a.user_id == user_id)
            .cloned())
    }

    async fn list_assignments(
        &self,
        admin_id: Option<AdminId>,
    ) -> Result<Vec<AssignmentRecord>, RepositoryError> {
        let tables = self.tables();
        let mut matching: Vec<&Assignment> = tables
            .assignments
            .iter()
            .filter(|a| admin_id.is_none_or(|id| a.admin_id == id))
            .collect();
        matching.sort_by_key(|a| (a.assigned_at, a.id));
        matching.into_iter().map(|a| tables.record(a)).collect()
    }

    async fn list_unassigned_clients(&self) -> Result<Vec<Client>, RepositoryError> {
        let tables = self.tables();
        let mut clients: Vec<Client> = tables
            .clients
            .iter()
            .filter(|c| !tables.assignments.iter().any(|a| a.client_user_id == c.id))
            .cloned()
            .collect();
        clients.sort_by(|a, b| (&a.company, &a.email, a.id).cmp(&(&b.company, &b.email, b.id)));
        Ok(clients)
    }

    async fn create_assignment(&self, new: NewAssignment) -> Result<Assignment, RepositoryError> {
        let mut tables = self.tables();

        if tables
            .assignments
            .iter()
            .any(|a| a.client_user_id == new.client_id)
        {
            return Err(RepositoryError::DuplicateAssignment(new.client_id));
        }
        if !tables.admin_exists(new.admin_id) {
            return Err(RepositoryError::NotFound(format!("admin {}", new.admin_id)));
        }
        if !tables.admin_exists(new.assigned_by) {
            return Err(RepositoryError::NotFound(format!(
                "admin {}",
                new.assigned_by
            )));
        }
        if !tables.clients.iter().any(|c| c.id == new.client_id) {
            return Err(RepositoryError::NotFound(format!(
                "client {}",
                new.client_id
            )));
        }

        let assignment = Assignment {
            id: AssignmentId::generate(),
            admin_id: new.admin_id,
            client_user_id: new.client_id,
            assigned_at: Utc::now(),
            assigned_by: new.assigned_by,
        };
        tables.assignments.push(assignment.clone());
        Ok(assignment)
    }

    async fn delete_assignment(&self, id: AssignmentId) -> Result<(), RepositoryError> {
        let mut tables = self.tables();
        let before = tables.assignments.len();
        tables.assignments.retain(|a| a.id != id);

        if tables.assignments.len() == before {
            return Err(RepositoryError::NotFound(format!("assignment {id}")));
        }

        Ok(())
    }
}
