//! Content Desk Core - Shared types library.
//!
//! This crate provides common types used across all Content Desk components:
//! - `admin` - Client assignment engine and its HTTP surface
//! - `cli` - Command-line tools for migrations and admin management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and admin roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
