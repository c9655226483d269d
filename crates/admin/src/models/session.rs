//! Session-related types.
//!
//! The login flow (outside this crate) writes the authenticated identity into
//! the shared session store; this crate only reads it.

use serde::{Deserialize, Serialize};

use content_desk_core::UserId;

/// Session-stored identity of the logged-in user.
///
/// Only the user ID is trusted from the session. Roles are always resolved
/// against the admin table so a stale session cannot carry stale privileges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Authenticated user ID.
    pub user_id: UserId,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
