//! Custom error types specific to the `adapters` crate.
//!
//! This module defines errors that can occur while talking to the external
//! REST backend: transport failures, rejected credentials, unexpected status
//! codes and undecodable bodies.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("invalid upstream base url: {0}")]
    InvalidBaseUrl(String),

    #[error("upstream request failed: {0}")]
    Transport(String),

    #[error("upstream rejected the session credential")]
    Unauthorized,

    #[error("upstream returned status {status} for {endpoint}")]
    Status { status: u16, endpoint: &'static str },

    #[error("cannot decode {endpoint} response: {message}")]
    Decode {
        endpoint: &'static str,
        message: String,
    },
}

impl AdapterError {
    /// Short, stable label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AdapterError::InvalidBaseUrl(_) => "invalid_base_url",
            AdapterError::Transport(_) => "transport",
            AdapterError::Unauthorized => "unauthorized",
            AdapterError::Status { .. } => "status",
            AdapterError::Decode { .. } => "decode",
        }
    }
}
