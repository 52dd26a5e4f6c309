//! Authentication module for sessions and role-based access control.
//!
//! This module provides the public interface for the session gate: credential
//! verification, the role-to-route access table, the route guard middleware,
//! and the login, logout and session-resolution endpoints.

pub mod access;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;

// Re-exports for convenience
pub use access::*;
pub use errors::*;
pub use middleware::*;
pub use models::*;
pub use routes::*;
pub use service::*;
