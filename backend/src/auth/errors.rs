//! Custom error types specific to authentication failures.
//!
//! Every variant is terminal for the request that produced it: the route
//! guard turns it into a redirect and never retries. The variant is kept
//! distinct only so it can be logged.

use thiserror::Error;

use super::models::Role;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("no session credential presented")]
    MissingCredential,

    #[error("session credential is malformed or its signature does not verify: {0}")]
    InvalidCredential(String),

    #[error("session credential expired at {expired_at}")]
    ExpiredCredential { expired_at: i64 },

    #[error("role {role} is not permitted for {path}")]
    RoleMismatch { role: Role, path: String },
}

impl AuthError {
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "missing_credential",
            AuthError::InvalidCredential(_) => "invalid_credential",
            AuthError::ExpiredCredential { .. } => "expired_credential",
            AuthError::RoleMismatch { .. } => "role_mismatch",
        }
    }
}
