//! Middleware for protecting authenticated routes and handling authorization.
//!
//! The route guard runs in front of every handler. Its decision is a pure
//! function of the request path, the presented credential and the access
//! table (`evaluate`); the axum layer (`route_guard`) only extracts the
//! inputs, applies the decision and logs it. A failed evaluation is terminal:
//! the request is redirected and no handler code runs.

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, COOKIE};
use axum::http::{HeaderMap, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use chrono::Utc;
use tracing::{debug, warn};

use super::access::{AccessTable, Requirement};
use super::errors::AuthError;
use super::models::Identity;
use super::service::CredentialVerifier;
use crate::AppState;
use conduct_adapters::TOKEN_COOKIE;

pub const LOGIN_PATH: &str = "/login";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

/// Raw session credential of an authorized request, for forwarding upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCredential {
    pub token: String,
    /// `exp` of the credential (unix seconds).
    pub expires_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    NoToken,
    TokenInvalid(AuthError),
    TokenValidWrongRole(Identity),
    TokenValidAuthorized(Identity),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Public path, passed through untouched.
    Pass,
    Authorized { identity: Identity, expires_at: i64 },
    Redirect {
        to: &'static str,
        state: GuardState,
    },
}

pub fn evaluate(
    path: &str,
    token: Option<&str>,
    verifier: &CredentialVerifier,
    table: &AccessTable,
    now: i64,
) -> GuardDecision {
    let requirement = table.requirement_for(path);
    if requirement == Requirement::Public {
        return GuardDecision::Pass;
    }

    let (state, expires_at) = match token {
        None => (GuardState::NoToken, 0),
        Some(token) => match verifier.claims_at(token, now) {
            Err(err) => (GuardState::TokenInvalid(err), 0),
            Ok(claims) => {
                let expires_at = claims.exp;
                let identity = Identity::from(claims);
                if requirement.permits(identity.role) {
                    (GuardState::TokenValidAuthorized(identity), expires_at)
                } else {
                    (GuardState::TokenValidWrongRole(identity), expires_at)
                }
            }
        },
    };

    match state {
        GuardState::TokenValidAuthorized(identity) => GuardDecision::Authorized {
            identity,
            expires_at,
        },
        GuardState::TokenValidWrongRole(_) => GuardDecision::Redirect {
            to: UNAUTHORIZED_PATH,
            state,
        },
        GuardState::NoToken | GuardState::TokenInvalid(_) => GuardDecision::Redirect {
            to: LOGIN_PATH,
            state,
        },
    }
}

/// Value of the session cookie, if the request carries a non-empty one.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub async fn route_guard(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let token = session_token(request.headers());

    let decision = evaluate(
        &path,
        token.as_deref(),
        &state.verifier,
        &state.access,
        Utc::now().timestamp(),
    );

    match decision {
        GuardDecision::Pass => next.run(request).await,
        GuardDecision::Authorized {
            identity,
            expires_at,
        } => {
            debug!(
                %path,
                subject = %identity.subject_id,
                role = %identity.role,
                "guard authorized"
            );
            let extensions = request.extensions_mut();
            extensions.insert(identity);
            if let Some(token) = token {
                extensions.insert(SessionCredential { token, expires_at });
            }
            next.run(request).await
        }
        GuardDecision::Redirect { to, state: guard } => {
            match &guard {
                GuardState::TokenInvalid(err) => {
                    warn!(%path, kind = err.kind(), error = %err, "guard rejected credential");
                }
                GuardState::TokenValidWrongRole(identity) => {
                    let err = AuthError::RoleMismatch {
                        role: identity.role,
                        path: path.clone(),
                    };
                    debug!(
                        %path,
                        kind = err.kind(),
                        subject = %identity.subject_id,
                        "guard denied role"
                    );
                }
                _ => debug!(%path, kind = AuthError::MissingCredential.kind(), "guard redirect"),
            }
            let location = if to == LOGIN_PATH && state.config.preserve_return_path {
                login_with_return(&path)
            } else {
                to.to_string()
            };
            no_store(Redirect::to(&location).into_response())
        }
    }
}

pub(crate) fn login_with_return(path: &str) -> String {
    let mut encoded = String::with_capacity(path.len());
    for ch in path.chars() {
        match ch {
            '%' => encoded.push_str("%25"),
            '&' => encoded.push_str("%26"),
            '+' => encoded.push_str("%2B"),
            '=' => encoded.push_str("%3D"),
            '#' => encoded.push_str("%23"),
            '?' => encoded.push_str("%3F"),
            ' ' => encoded.push_str("%20"),
            other => encoded.push(other),
        }
    }
    format!("{LOGIN_PATH}?next={encoded}")
}

pub(crate) fn no_store(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;

    const NOW: i64 = 1_700_000_000;

    fn verifier() -> CredentialVerifier {
        CredentialVerifier::new(b"guard-secret")
    }

    fn token_for(role: Role, expires_at: i64) -> String {
        let identity = Identity {
            subject_id: "u1".to_string(),
            role,
        };
        verifier()
            .issue_at(&identity, NOW - 60, expires_at)
            .expect("issue")
    }

    fn eval(path: &str, token: Option<&str>) -> GuardDecision {
        evaluate(path, token, &verifier(), &AccessTable::standard(), NOW)
    }

    #[test]
    fn login_page_passes_without_token() {
        assert_eq!(eval("/login", None), GuardDecision::Pass);
    }

    #[test]
    fn missing_token_on_admin_route_redirects_to_login() {
        assert_eq!(
            eval("/uit/admin/students", None),
            GuardDecision::Redirect {
                to: LOGIN_PATH,
                state: GuardState::NoToken
            }
        );
    }

    #[test]
    fn expired_token_is_treated_like_no_token() {
        let token = token_for(Role::Admin, NOW - 1);
        match eval("/uit/admin", Some(&token)) {
            GuardDecision::Redirect {
                to,
                state: GuardState::TokenInvalid(AuthError::ExpiredCredential { .. }),
            } => assert_eq!(to, LOGIN_PATH),
            other => panic!("unexpected decision: {other:?}"),
        }
    }

    #[test]
    fn student_on_admin_route_is_unauthorized() {
        let token = token_for(Role::Student, NOW + 3600);
        match eval("/uit/admin", Some(&token)) {
            GuardDecision::Redirect {
                to,
                state: GuardState::TokenValidWrongRole(identity),
            } => {
                assert_eq!(to, UNAUTHORIZED_PATH);
                assert_eq!(identity.role, Role::Student);
            }
            other => panic!("unexpected decision: {other:?}"),
        }
    }

    #[test]
    fn matching_role_is_authorized_with_identity() {
        let token = token_for(Role::Lecturer, NOW + 3600);
        assert_eq!(
            eval("/uit/lecturer/activities", Some(&token)),
            GuardDecision::Authorized {
                identity: Identity {
                    subject_id: "u1".to_string(),
                    role: Role::Lecturer,
                },
                expires_at: NOW + 3600,
            }
        );
    }

    #[test]
    fn non_admin_roles_never_reach_admin_prefix() {
        for role in Role::ALL.into_iter().filter(|r| *r != Role::Admin) {
            let token = token_for(role, NOW + 3600);
            assert!(
                !matches!(
                    eval("/uit/admin/faculties", Some(&token)),
                    GuardDecision::Authorized { .. } | GuardDecision::Pass
                ),
                "{role} reached admin prefix"
            );
        }
    }

    #[test]
    fn any_role_may_reach_shared_protected_routes() {
        let token = token_for(Role::ClassLeader, NOW + 3600);
        assert!(matches!(
            eval("/uit/reference", Some(&token)),
            GuardDecision::Authorized { .. }
        ));
    }

    #[test]
    fn session_token_reads_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; token=abc.def; lang=vi"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc.def"));

        headers.insert(COOKIE, HeaderValue::from_static("token="));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn return_path_is_query_encoded() {
        assert_eq!(
            login_with_return("/uit/admin/a&b"),
            "/login?next=/uit/admin/a%26b"
        );
    }
}
