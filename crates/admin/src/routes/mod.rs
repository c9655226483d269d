//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                        - Liveness check
//! GET    /health/ready                  - Readiness check (database)
//!
//! GET    /api/access                    - Caller's role and client visibility
//! GET    /api/assignments               - Registry snapshot for the caller
//! POST   /api/assignments               - Assign a client to a sub-admin
//! DELETE /api/assignments/{id}          - Remove an assignment
//! POST   /api/assignments/bulk/preview  - Validate and describe a bulk operation
//! POST   /api/assignments/bulk          - Run a bulk operation
//! ```
//!
//! The health routes are mounted by the binary.

pub mod assignments;

use axum::Router;

use crate::state::AppState;

/// Build the API router.
pub fn routes() -> Router<AppState> {
    Router::new().merge(assignments::router())
}
