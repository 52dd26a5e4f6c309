mod support;

use std::net::SocketAddr;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::get as route_get;
use axum::{Json, Router};
use conduct_backend::auth::models::Role;
use conduct_backend::AppState;
use serde_json::{json, Value};
use support::{config, cookie, get, spawn_app, token};

fn forwarded_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("token="))
        .map(str::to_string)
}

async fn spawn_backend() -> SocketAddr {
    let app = Router::new()
        .route(
            "/api/auth/me",
            route_get(|headers: HeaderMap| async move {
                match forwarded_token(&headers) {
                    Some(_) => Ok(Json(json!({"role": "admin", "subject_id": "ad01"}))),
                    None => Err(StatusCode::UNAUTHORIZED),
                }
            }),
        )
        .route(
            "/api/faculties",
            route_get(|| async {
                Json(json!({"faculties": [{"id": 1, "name": "CNTT", "faculty_abbr": "CNTT"}]}))
            }),
        )
        .route(
            "/api/classes",
            route_get(|| async {
                Json(json!({"classes": [{"id": 10, "faculty_id": 1, "name": "CNTT2022"}]}))
            }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve backend") });
    addr
}

#[tokio::test]
async fn reference_data_flows_from_rest_backend() {
    let backend = spawn_backend().await;
    let mut cfg = config();
    cfg.upstream_url = format!("http://{backend}");
    let addr = spawn_app(AppState::from_config(cfg).expect("state")).await;
    let admin = cookie(&token(Role::Admin, "ad01"));

    let resp = get(
        addr,
        "/uit/reference/classes?faculty_id=1",
        &[("Cookie", admin.as_str())],
    )
    .await;
    assert_eq!(resp.status, 200);
    let json: Value = resp.json();
    assert_eq!(
        json["classes"],
        json!([{"id": 10, "faculty_id": 1, "name": "CNTT2022"}])
    );

    let resp = get(addr, "/uit", &[("Cookie", admin.as_str())]).await;
    assert_eq!(resp.location(), Some("/uit/admin"));
}

#[tokio::test]
async fn unreachable_backend_degrades_to_login_and_empty_reference_data() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let dead = listener.local_addr().expect("local addr");
    drop(listener);

    let mut cfg = config();
    cfg.upstream_url = format!("http://{dead}");
    let addr = spawn_app(AppState::from_config(cfg).expect("state")).await;
    let lecturer = cookie(&token(Role::Lecturer, "gv01"));

    let resp = get(addr, "/uit", &[("Cookie", lecturer.as_str())]).await;
    assert_eq!(resp.location(), Some("/login"));

    let resp = get(addr, "/uit/reference", &[("Cookie", lecturer.as_str())]).await;
    assert_eq!(resp.status, 200);
    let json = resp.json();
    assert_eq!(json["faculties"], json!([]));
    assert!(json["error"].is_string());
}
