//! Domain models for the assignment engine.
//!
//! These are validated domain objects; database row types live in [`crate::db`].

pub mod admin;
pub mod assignment;
pub mod client;
pub mod session;

pub use admin::{Admin, AdminSummary};
pub use assignment::{Assignment, AssignmentRecord, NewAssignment};
pub use client::Client;
pub use session::{CurrentUser, keys as session_keys};

// Re-export AdminRole from core for convenience
pub use content_desk_core::AdminRole;
