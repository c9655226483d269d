//! Client domain type.

use serde::Serialize;

use content_desk_core::{ClientId, Email};

/// An end-user/company account that can be assigned to a sub-admin.
///
/// Clients are created by the identity subsystem; this crate only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Client {
    pub id: ClientId,
    pub email: Email,
    pub company: String,
}
