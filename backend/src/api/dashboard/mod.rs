//! Module for the role dashboard endpoints.
//!
//! Each role-scoped prefix in the access table gets a landing endpoint. The
//! route guard has already matched the caller's role to the prefix by the
//! time a dashboard handler runs.

pub mod handlers;
pub mod routes;
