//! Content Desk admin library.
//!
//! Decides which clients each admin may see and lets super-admins assign,
//! unassign and transfer clients between sub-admins, one at a time or in bulk.
//!
//! The binary in `main.rs` wires this library into an axum server; the
//! library itself is usable without HTTP through [`services`] and any
//! [`store::AssignmentStore`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
