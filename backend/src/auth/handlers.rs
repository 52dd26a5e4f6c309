//! Handler functions for authentication-related endpoints.
//!
//! These functions serve the login and unauthorized pages, proxy login
//! credentials to the external backend and store the returned session
//! credential in the `token` cookie, clear it on logout, and resolve the
//! authenticated root route to the caller's dashboard.

use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Extension, Form};
use chrono::Utc;
use conduct_adapters::{AdapterError, LoginCredentials, TOKEN_COOKIE};
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use super::access::PROTECTED_ROOT;
use super::middleware::{no_store, session_token, SessionCredential, LOGIN_PATH};
use super::models::LoginRequest;
use crate::errors::AppError;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LoginPageParams {
    pub error: Option<String>,
    pub next: Option<String>,
}

pub async fn login_page(Query(params): Query<LoginPageParams>) -> Html<String> {
    let notice = if params.error.is_some() {
        r#"<p class="error">Sai tên đăng nhập hoặc mật khẩu.</p>"#
    } else {
        ""
    };
    let next = params
        .next
        .filter(|next| is_safe_return_path(next))
        .map(|next| {
            format!(
                r#"<input type="hidden" name="next" value="{}">"#,
                escape_attr(&next)
            )
        })
        .unwrap_or_default();
    Html(format!(
        r#"<!doctype html><html><body><h1>Đăng nhập</h1>{notice}<form method="post" action="{LOGIN_PATH}"><input name="username"><input name="password" type="password">{next}<button type="submit">Đăng nhập</button></form></body></html>"#
    ))
}

pub async fn unauthorized_page() -> Response {
    no_store(
        (
            StatusCode::FORBIDDEN,
            Html("<!doctype html><html><body><h1>Không có quyền truy cập</h1></body></html>"),
        )
            .into_response(),
    )
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginRequest>,
) -> Result<Response, AppError> {
    form.validate()?;
    let credentials = LoginCredentials {
        username: form.username,
        password: form.password,
    };

    let issued = match state.api.login(&credentials).await {
        Ok(issued) => issued,
        Err(AdapterError::Unauthorized) => {
            info!(username = %credentials.username, "login rejected");
            return Ok(no_store(
                Redirect::to(&format!("{LOGIN_PATH}?error=1")).into_response(),
            ));
        }
        Err(err) => return Err(err.into()),
    };

    let now = Utc::now().timestamp();
    let claims = match state.verifier.claims_at(&issued.token, now) {
        Ok(claims) => claims,
        Err(err) => {
            warn!(kind = err.kind(), error = %err, "backend issued an unusable credential");
            return Ok(no_store(
                Redirect::to(&format!("{LOGIN_PATH}?error=1")).into_response(),
            ));
        }
    };
    info!(subject = %claims.sub, role = %claims.role, "login succeeded");

    let landing = form
        .next
        .filter(|next| is_safe_return_path(next))
        .unwrap_or_else(|| PROTECTED_ROOT.to_string());
    let mut response = Redirect::to(&landing).into_response();
    let cookie = session_cookie(&issued.token, claims.exp - now, state.config.cookie_secure)?;
    response.headers_mut().insert(SET_COOKIE, cookie);
    Ok(no_store(response))
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        if let Ok(claims) = state.verifier.claims_ignoring_expiry(&token) {
            state.reference.unmount(&token);
            info!(subject = %claims.sub, "logout");
        }
    }
    let mut response = Redirect::to(LOGIN_PATH).into_response();
    if let Ok(cookie) = session_cookie("", 0, state.config.cookie_secure) {
        response.headers_mut().insert(SET_COOKIE, cookie);
    }
    no_store(response)
}

/// Authenticated root: looks the session up once and redirects to its dashboard.
pub async fn session_root(
    State(state): State<AppState>,
    Extension(credential): Extension<SessionCredential>,
) -> Response {
    let navigation = state.resolver.resolve(&credential.token).await;
    no_store(Redirect::to(navigation.location()).into_response())
}

fn session_cookie(token: &str, max_age: i64, secure: bool) -> Result<HeaderValue, AppError> {
    let mut cookie = format!(
        "{TOKEN_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        max_age.max(0)
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
        .map_err(|_| AppError::Validation("credential is not a valid cookie value".to_string()))
}

fn is_safe_return_path(path: &str) -> bool {
    let under_root = path == PROTECTED_ROOT || path.starts_with(&format!("{PROTECTED_ROOT}/"));
    under_root && !path.contains("//") && !path.contains('\\')
}

fn escape_attr(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
