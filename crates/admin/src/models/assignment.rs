//! Assignment domain types.
//!
//! An assignment links one client to one sub-admin. At most one assignment
//! exists per client at any time.

use chrono::{DateTime, Utc};
use serde::Serialize;

use content_desk_core::{AdminId, AssignmentId, ClientId, Email};

/// A stored admin to client assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    /// Unique assignment ID.
    pub id: AssignmentId,
    /// Sub-admin the client is assigned to.
    pub admin_id: AdminId,
    /// Assigned client.
    pub client_user_id: ClientId,
    /// When the assignment was created.
    pub assigned_at: DateTime<Utc>,
    /// Super-admin who created the assignment.
    pub assigned_by: AdminId,
}

/// An assignment joined with the assigned client's contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentRecord {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub client_email: Email,
    pub client_company: String,
}

impl AssignmentRecord {
    /// Whether this record assigns `client_id` to `admin_id`.
    #[must_use]
    pub fn matches(&self, admin_id: AdminId, client_id: ClientId) -> bool {
        self.assignment.admin_id == admin_id && self.assignment.client_user_id == client_id
    }
}

/// Input for creating an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewAssignment {
    pub admin_id: AdminId,
    pub client_id: ClientId,
    pub assigned_by: AdminId,
}
