//! Admin domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use content_desk_core::{AdminId, AdminRole, Email, UserId};

/// An admin (domain type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Admin {
    /// Unique admin ID.
    pub id: AdminId,
    /// Authenticated identity this admin record belongs to.
    pub user_id: UserId,
    /// Admin's email address.
    pub email: Email,
    /// Admin's role. Fixed at creation.
    pub role: AdminRole,
    /// When the admin was created.
    pub created_at: DateTime<Utc>,
}

/// An admin together with the number of clients currently assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminSummary {
    #[serde(flatten)]
    pub admin: Admin,
    pub assigned_count: i64,
}
