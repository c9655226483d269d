//! `PostgreSQL` implementation of the assignment store.
//!
//! Queries are checked at runtime (`query_as`) so the crate builds without a
//! live database. Constraint names come from the migrations in
//! `crates/admin/migrations/`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use content_desk_core::{AdminId, AdminRole, AssignmentId, ClientId, Email, UserId};

use super::RepositoryError;
use crate::models::{Admin, AdminSummary, Assignment, AssignmentRecord, Client, NewAssignment};
use crate::store::AssignmentStore;

const ADMIN_FK: &str = "client_assignment_admin_id_fkey";
const ASSIGNED_BY_FK: &str = "client_assignment_assigned_by_fkey";
const CLIENT_FK: &str = "client_assignment_client_user_id_fkey";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AdminRow {
    id: AdminId,
    user_id: UserId,
    email: String,
    role: AdminRole,
    created_at: DateTime<Utc>,
}

impl TryFrom<AdminRow> for Admin {
    type Error = RepositoryError;

    fn try_from(row: AdminRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            email: parse_email(&row.email)?,
            role: row.role,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AdminSummaryRow {
    #[sqlx(flatten)]
    admin: AdminRow,
    assigned_count: i64,
}

impl TryFrom<AdminSummaryRow> for AdminSummary {
    type Error = RepositoryError;

    fn try_from(row: AdminSummaryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            admin: row.admin.try_into()?,
            assigned_count: row.assigned_count,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AssignmentRow {
    id: AssignmentId,
    admin_id: AdminId,
    client_user_id: ClientId,
    assigned_at: DateTime<Utc>,
    assigned_by: AdminId,
}

impl From<AssignmentRow> for Assignment {
    fn from(row: AssignmentRow) -> Self {
        Self {
            id: row.id,
            admin_id: row.admin_id,
            client_user_id: row.client_user_id,
            assigned_at: row.assigned_at,
            assigned_by: row.assigned_by,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AssignmentRecordRow {
    #[sqlx(flatten)]
    assignment: AssignmentRow,
    client_email: String,
    client_company: String,
}

impl TryFrom<AssignmentRecordRow> for AssignmentRecord {
    type Error = RepositoryError;

    fn try_from(row: AssignmentRecordRow) -> Result<Self, Self::Error> {
        Ok(Self {
            assignment: row.assignment.into(),
            client_email: parse_email(&row.client_email)?,
            client_company: row.client_company,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ClientRow {
    id: ClientId,
    email: String,
    company: String,
}

impl TryFrom<ClientRow> for Client {
    type Error = RepositoryError;

    fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            email: parse_email(&row.email)?,
            company: row.company,
        })
    }
}

fn parse_email(raw: &str) -> Result<Email, RepositoryError> {
    Email::parse(raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid email in database: {e}")))
}

/// Translate an insert failure into the store's error contract.
fn map_insert_error(err: sqlx::Error, new: &NewAssignment) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return RepositoryError::DuplicateAssignment(new.client_id);
        }
        if db_err.is_foreign_key_violation() {
            return match db_err.constraint() {
                Some(CLIENT_FK) => RepositoryError::NotFound(format!("client {}", new.client_id)),
                Some(ADMIN_FK) => RepositoryError::NotFound(format!("admin {}", new.admin_id)),
                Some(ASSIGNED_BY_FK) => {
                    RepositoryError::NotFound(format!("admin {}", new.assigned_by))
                }
                _ => RepositoryError::NotFound("referenced admin or client".to_owned()),
            };
        }
    }
    RepositoryError::Database(err)
}

// =============================================================================
// Store
// =============================================================================

/// Assignment store backed by the `desk` schema.
#[derive(Debug, Clone)]
pub struct PgAssignmentStore {
    pool: PgPool,
}

impl PgAssignmentStore {
    /// Create a new store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AssignmentStore for PgAssignmentStore {
    #[instrument(skip(self))]
    async fn list_admins(&self) -> Result<Vec<AdminSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminSummaryRow>(
            r"
            SELECT a.id, a.user_id, a.email, a.role, a.created_at,
                   COUNT(ca.id) AS assigned_count
            FROM desk.admin_user a
            LEFT JOIN desk.client_assignment ca ON ca.admin_id = a.id
            GROUP BY a.id
            ORDER BY a.created_at, a.id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[instrument(skip(self))]
    async fn find_admin_by_user(&self, user_id: UserId) -> Result<Option<Admin>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminRow>(
            r"
            SELECT id, user_id, email, role, created_at
            FROM desk.admin_user
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    #[instrument(skip(self))]
    async fn list_assignments(
        &self,
        admin_id: Option<AdminId>,
    ) -> Result<Vec<AssignmentRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, AssignmentRecordRow>(
            r"
            SELECT ca.id, ca.admin_id, ca.client_user_id, ca.assigned_at, ca.assigned_by,
                   c.email AS client_email, c.company AS client_company
            FROM desk.client_assignment ca
            JOIN desk.client c ON c.id = ca.client_user_id
            WHERE ($1::uuid IS NULL OR ca.admin_id = $1)
            ORDER BY ca.assigned_at, ca.id
            ",
        )
        .bind(admin_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[instrument(skip(self))]
    async fn list_unassigned_clients(&self) -> Result<Vec<Client>, RepositoryError> {
        let rows = sqlx::query_as::<_, ClientRow>(
            r"
            SELECT c.id, c.email, c.company
            FROM desk.client c
            WHERE NOT EXISTS (
                SELECT 1 FROM desk.client_assignment ca WHERE ca.client_user_id = c.id
            )
            ORDER BY c.company, c.email, c.id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[instrument(skip(self))]
    async fn create_assignment(&self, new: NewAssignment) -> Result<Assignment, RepositoryError> {
        let row = sqlx::query_as::<_, AssignmentRow>(
            r"
            INSERT INTO desk.client_assignment (admin_id, client_user_id, assigned_by)
            VALUES ($1, $2, $3)
            RETURNING id, admin_id, client_user_id, assigned_at, assigned_by
            ",
        )
        .bind(new.admin_id)
        .bind(new.client_id)
        .bind(new.assigned_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &new))?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn delete_assignment(&self, id: AssignmentId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM desk.client_assignment
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("assignment {id}")));
        }

        Ok(())
    }
}
