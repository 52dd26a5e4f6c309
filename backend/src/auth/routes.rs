//! Defines the HTTP routes specifically for authentication.
//!
//! These routes handle the login and logout flow, the unauthorized page and
//! the authenticated root that resolves a session to its dashboard. They are
//! designed to be merged into the main Axum router behind the route guard.

use axum::routing::{get, post};
use axum::Router;

use super::access::PROTECTED_ROOT;
use super::handlers::{login, login_page, logout, session_root, unauthorized_page};
use super::middleware::{LOGIN_PATH, UNAUTHORIZED_PATH};
use crate::AppState;

pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route(LOGIN_PATH, get(login_page).post(login))
        .route("/logout", post(logout))
        .route(UNAUTHORIZED_PATH, get(unauthorized_page))
        .route(PROTECTED_ROOT, get(session_root))
}
