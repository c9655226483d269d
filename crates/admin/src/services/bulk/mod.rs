//! Bulk assignment operations.
//!
//! A request body becomes a [`BulkIntent`], which [`plan`] validates into a
//! [`BulkPlan`] carrying a closed [`BulkOperation`]. [`BulkExecutor`] then
//! runs the plan one client at a time against the registry.

mod executor;
mod plan;

pub use executor::{BulkExecutor, BulkResult, ItemFailure, ItemFailureView};
pub use plan::{BulkIntent, BulkKind, BulkOperation, BulkPlan, ValidationError, plan};
