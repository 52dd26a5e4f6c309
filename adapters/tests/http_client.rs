use std::net::SocketAddr;
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use conduct_adapters::{AdapterError, ConductApi, HttpConductApi, LoginCredentials};
use serde_json::{json, Value};

fn has_token(headers: &HeaderMap) -> bool {
    headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("token=good"))
        .unwrap_or(false)
}

async fn me(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    if has_token(&headers) {
        Ok(Json(json!({"role": "lecturer", "subject_id": "gv01"})))
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

async fn faculties() -> Json<Value> {
    Json(json!({"faculties": [{"id": 1, "name": "CNTT", "faculty_abbr": "CNTT"}]}))
}

async fn classes() -> (StatusCode, &'static str) {
    (StatusCode::OK, "{\"classes\": 12}")
}

async fn login(Json(body): Json<Value>) -> Result<Json<Value>, StatusCode> {
    if body.get("password").and_then(Value::as_str) == Some("secret") {
        Ok(Json(json!({"token": "good"})))
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

async fn spawn_upstream() -> SocketAddr {
    let app = Router::new()
        .route("/api/auth/me", get(me))
        .route("/api/auth/login", post(login))
        .route("/api/faculties", get(faculties))
        .route("/api/classes", get(classes));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve upstream") });
    addr
}

fn client(addr: SocketAddr) -> HttpConductApi {
    HttpConductApi::new(&format!("http://{addr}"), Duration::from_secs(2)).expect("client")
}

#[tokio::test]
async fn identity_forwards_session_cookie() {
    let api = client(spawn_upstream().await);

    let identity = api.current_identity("good").await.expect("identity");
    assert_eq!(identity.role, "lecturer");
    assert_eq!(identity.subject_id, "gv01");

    let err = api.current_identity("bad").await.expect_err("401 expected");
    assert!(matches!(err, AdapterError::Unauthorized));
}

#[tokio::test]
async fn reference_endpoints_unwrap_envelopes_and_report_bad_bodies() {
    let api = client(spawn_upstream().await);

    let faculties = api.faculties("good").await.expect("faculties");
    assert_eq!(faculties.len(), 1);
    assert_eq!(faculties[0].faculty_abbr.as_deref(), Some("CNTT"));

    let err = api.classes("good").await.expect_err("malformed classes body");
    assert_eq!(err.kind(), "decode");
}

#[tokio::test]
async fn login_returns_token_or_unauthorized() {
    let api = client(spawn_upstream().await);

    let issued = api
        .login(&LoginCredentials {
            username: "21520001".to_string(),
            password: "secret".to_string(),
        })
        .await
        .expect("login");
    assert_eq!(issued.token, "good");

    let err = api
        .login(&LoginCredentials {
            username: "21520001".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .expect_err("rejected login");
    assert!(matches!(err, AdapterError::Unauthorized));
}

#[tokio::test]
async fn unreachable_upstream_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let err = client(addr).faculties("good").await.expect_err("connection refused");
    assert_eq!(err.kind(), "transport");
}
