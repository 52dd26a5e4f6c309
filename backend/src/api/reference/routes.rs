//! Defines the HTTP routes for the shared reference data.
//!
//! These routes map the reference-data paths under the protected root to
//! handlers serving the session's cached faculties and classes.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{classes, refresh, snapshot};
use crate::AppState;

pub const REFERENCE_ROOT: &str = "/uit/reference";

pub fn reference_router() -> Router<AppState> {
    Router::new()
        .route(REFERENCE_ROOT, get(snapshot))
        .route("/uit/reference/refresh", post(refresh))
        .route("/uit/reference/classes", get(classes))
}
