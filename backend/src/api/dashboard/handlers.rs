//! Handler functions for the role dashboards.
//!
//! The dashboards themselves are rendered elsewhere; these handlers return
//! the verified session identity the dashboard is built for.

use axum::extract::OriginalUri;
use axum::{Extension, Json};
use serde::Serialize;

use crate::auth::models::{Identity, Role};

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub dashboard: String,
    pub subject_id: String,
    pub role: Role,
}

pub async fn dashboard(
    OriginalUri(uri): OriginalUri,
    Extension(identity): Extension<Identity>,
) -> Json<DashboardResponse> {
    Json(DashboardResponse {
        dashboard: uri.path().to_string(),
        subject_id: identity.subject_id,
        role: identity.role,
    })
}
