//! Core `adapters` crate for abstracting the conduct-score REST backend.
//!
//! This crate defines the `ConductApi` trait, which outlines the calls the
//! portal front tier makes against the external backend (identity lookup,
//! reference data, login), and provides the concrete HTTP implementation.

pub mod errors;
pub mod http;
pub mod models;

pub use errors::AdapterError;
pub use http::{HttpConductApi, TOKEN_COOKIE};
pub use models::*;

use async_trait::async_trait;

/// Calls the portal makes against the external REST backend.
///
/// Every call that acts on behalf of a session takes the raw session
/// credential, which is forwarded upstream unchanged.
#[async_trait]
pub trait ConductApi: Send + Sync {
    /// `GET /api/auth/me`
    async fn current_identity(&self, token: &str) -> Result<RemoteIdentity, AdapterError>;

    /// `GET /api/faculties`
    async fn faculties(&self, token: &str) -> Result<Vec<Faculty>, AdapterError>;

    /// `GET /api/classes`
    async fn classes(&self, token: &str) -> Result<Vec<Class>, AdapterError>;

    /// `POST /api/auth/login`
    async fn login(&self, credentials: &LoginCredentials) -> Result<IssuedToken, AdapterError>;
}
