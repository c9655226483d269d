//! HTTP middleware and extractors.
//!
//! Layer order in the router (innermost first): session layer, `TraceLayer`,
//! then the Sentry layers outermost.

pub mod auth;
pub mod session;

pub use auth::{RequireAccess, RequireIdentity};
pub use session::create_session_layer;
