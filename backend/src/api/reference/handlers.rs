//! Handler functions for the shared reference-data API.
//!
//! These handlers mount the session's reference-data cache on first use,
//! wait for its initial load and serve snapshots from it. A backend failure
//! is reported inside the snapshot (`error`) with empty lists rather than as
//! an error status, so views keep rendering.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::{Extension, Json};
use conduct_adapters::Class;
use serde::{Deserialize, Serialize};

use crate::auth::middleware::SessionCredential;
use crate::auth::models::Identity;
use crate::services::{ReferenceDataCache, ReferenceSnapshot};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ClassFilter {
    pub faculty_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct FilteredClasses {
    pub faculty_id: Option<i64>,
    pub classes: Vec<Class>,
    pub loading: bool,
    pub error: Option<String>,
}

fn session_cache(
    state: &AppState,
    identity: &Identity,
    credential: &SessionCredential,
) -> Arc<ReferenceDataCache> {
    state
        .reference
        .get_or_mount(&identity.subject_id, &credential.token, credential.expires_at)
}

pub async fn snapshot(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Extension(credential): Extension<SessionCredential>,
) -> Json<ReferenceSnapshot> {
    let cache = session_cache(&state, &identity, &credential);
    let snapshot = cache.wait_ready().await;
    Json(snapshot.as_ref().clone())
}

pub async fn refresh(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Extension(credential): Extension<SessionCredential>,
) -> Json<ReferenceSnapshot> {
    let cache = session_cache(&state, &identity, &credential);
    let snapshot = cache.refresh().await;
    Json(snapshot.as_ref().clone())
}

pub async fn classes(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Extension(credential): Extension<SessionCredential>,
    Query(filter): Query<ClassFilter>,
) -> Json<FilteredClasses> {
    let cache = session_cache(&state, &identity, &credential);
    let snapshot = cache.wait_ready().await;
    Json(FilteredClasses {
        faculty_id: filter.faculty_id,
        classes: snapshot.filtered_classes(filter.faculty_id),
        loading: snapshot.loading,
        error: snapshot.error.clone(),
    })
}
