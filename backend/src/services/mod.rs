//! Module for core business logic services.
//!
//! This module encapsulates services that orchestrate interactions between
//! the HTTP layer and the external REST backend: resolving which dashboard a
//! session lands on, and holding the per-session reference data (faculties,
//! classes) shared by every view of that session.

pub mod reference_data;
pub mod session_resolver;

pub use reference_data::{ReferenceDataCache, ReferenceDataRegistry, ReferenceSnapshot};
pub use session_resolver::{Navigation, SessionResolver};
