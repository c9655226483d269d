//! Business logic services for the assignment engine.
//!
//! # Services
//!
//! - `access` - Resolves an identity to an [`AccessContext`] (role + visible clients)
//! - `registry` - In-memory reflection of assignments with `assign` / `unassign`
//! - `bulk` - Bulk assign/unassign/transfer planning and execution
//!
//! Every mutation takes the caller's [`AccessContext`] explicitly; there is no
//! ambient "current admin".

pub mod access;
pub mod bulk;
pub mod error;
pub mod registry;

pub use access::{AccessContext, AccessError, ClientVisibility, resolve_access};
pub use bulk::{
    BulkExecutor, BulkIntent, BulkKind, BulkOperation, BulkPlan, BulkResult, ItemFailure,
    ItemFailureView, ValidationError, plan,
};
pub use error::AssignmentError;
pub use registry::{AssignmentRegistry, RegistrySnapshot};
