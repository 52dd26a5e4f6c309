//! Module for the shared reference-data API.
//!
//! This module exposes the calling session's faculties and classes, the
//! faculty-filtered class view and an explicit refresh, all served from the
//! session's `ReferenceDataCache`.

pub mod handlers;
pub mod routes;
