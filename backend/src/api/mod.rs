//! Central module for organizing the application's main API endpoints.
//!
//! This module acts as a top-level container for the protected API domains,
//! the role dashboards and the shared reference data, excluding the login
//! and session-resolution routes which are handled by `auth`.

pub mod dashboard;
pub mod reference;
