//! Assignment engine error types.

use thiserror::Error;

use content_desk_core::{AdminId, ClientId};

use super::bulk::ValidationError;
use crate::db::RepositoryError;

/// Errors returned by registry and bulk operations.
#[derive(Debug, Error)]
pub enum AssignmentError {
    /// Caller's role does not allow the mutation. Raised before any store call.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Malformed bulk intent.
    #[error("invalid bulk operation: {0}")]
    Validation(#[from] ValidationError),

    /// Referenced admin or client does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Clients can only be assigned to sub-admins.
    #[error("admin {0} is not a sub-admin")]
    InvalidTarget(AdminId),

    /// The client already has an assignment.
    #[error("client {0} is already assigned")]
    DuplicateAssignment(ClientId),

    /// The assignment to remove does not exist (possibly removed concurrently).
    #[error("assignment not found: {0}")]
    AssignmentNotFound(String),

    /// A transfer removed the old assignment but could not create the new one.
    ///
    /// The client is left unassigned.
    #[error("client {client_id} was unassigned but not reassigned: {source}")]
    TransferIncomplete {
        client_id: ClientId,
        source: Box<AssignmentError>,
    },

    /// The store could not be reached or failed.
    #[error("store error: {0}")]
    Transport(RepositoryError),
}

impl From<RepositoryError> for AssignmentError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateAssignment(client_id) => Self::DuplicateAssignment(client_id),
            RepositoryError::NotFound(what) => Self::NotFound(what),
            other @ (RepositoryError::Database(_) | RepositoryError::DataCorruption(_)) => {
                Self::Transport(other)
            }
        }
    }
}

impl AssignmentError {
    /// Whether this is an expected, user-facing outcome rather than a system fault.
    #[must_use]
    pub const fn is_expected(&self) -> bool {
        !matches!(self, Self::Transport(_))
    }
}
