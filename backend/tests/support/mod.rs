#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Duration;
use conduct_backend::auth::models::{Identity, Role};
use conduct_backend::{build_router, AppConfig, AppState, CredentialVerifier, FakeConductApi};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

pub const SECRET: &str = "test-secret";

pub fn config() -> AppConfig {
    AppConfig::new(SECRET, "http://127.0.0.1:9")
}

pub fn token(role: Role, subject_id: &str) -> String {
    token_with_ttl(role, subject_id, Duration::hours(1))
}

pub fn token_with_ttl(role: Role, subject_id: &str, ttl: Duration) -> String {
    CredentialVerifier::new(SECRET.as_bytes())
        .issue(
            &Identity {
                subject_id: subject_id.to_string(),
                role,
            },
            ttl,
        )
        .expect("issue token")
}

pub fn cookie(token: &str) -> String {
    format!("token={token}")
}

pub async fn spawn_app(state: AppState) -> SocketAddr {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    addr
}

pub async fn spawn_with_fake(config: AppConfig, api: Arc<FakeConductApi>) -> SocketAddr {
    spawn_app(AppState::new(config, api)).await
}

pub struct RawResponse {
    pub status: u16,
    pub head: String,
    pub body: String,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim())
        })
    }

    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("json body")
    }
}

pub async fn send(
    addr: SocketAddr,
    method: &str,
    path: &str,
    headers: &[(&str, &str)],
    body: Option<&str>,
) -> RawResponse {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    for (k, v) in headers {
        req.push_str(&format!("{k}: {v}\r\n"));
    }
    if let Some(body) = body {
        req.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    req.push_str("\r\n");
    if let Some(body) = body {
        req.push_str(body);
    }
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response must have separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("http status");
    RawResponse {
        status,
        head: head.to_string(),
        body: body.to_string(),
    }
}

pub async fn get(addr: SocketAddr, path: &str, headers: &[(&str, &str)]) -> RawResponse {
    send(addr, "GET", path, headers, None).await
}
