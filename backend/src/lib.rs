//! Session gate for the conduct-score portal.
//!
//! This crate wires the route guard, the session resolver and the per-session
//! reference-data cache into one Axum router. Every request passes through
//! request tracing and then the guard before it reaches a handler.

#![forbid(unsafe_code)]

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
#[doc(hidden)]
pub mod fake_api;
pub mod middleware;
pub mod services;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;
use conduct_adapters::{ConductApi, HttpConductApi};

pub use crate::auth::access::AccessTable;
pub use crate::auth::service::CredentialVerifier;
pub use crate::config::AppConfig;
pub use crate::errors::AppError;
#[doc(hidden)]
pub use crate::fake_api::FakeConductApi;
pub use crate::services::{ReferenceDataRegistry, SessionResolver};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub verifier: Arc<CredentialVerifier>,
    pub access: Arc<AccessTable>,
    pub api: Arc<dyn ConductApi>,
    pub resolver: SessionResolver,
    pub reference: Arc<ReferenceDataRegistry>,
}

impl AppState {
    pub fn new(config: AppConfig, api: Arc<dyn ConductApi>) -> Self {
        let access = Arc::new(config.access_table());
        let verifier = Arc::new(CredentialVerifier::new(config.jwt_secret.as_bytes()));
        Self {
            resolver: SessionResolver::new(Arc::clone(&api), Arc::clone(&access)),
            reference: Arc::new(ReferenceDataRegistry::new(Arc::clone(&api))),
            config: Arc::new(config),
            verifier,
            access,
            api,
        }
    }

    /// State backed by the HTTP client for `config.upstream_url`.
    pub fn from_config(config: AppConfig) -> Result<Self, AppError> {
        let api = HttpConductApi::new(&config.upstream_url, config.upstream_timeout)?;
        Ok(Self::new(config, Arc::new(api)))
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(auth::routes::auth_router())
        .merge(api::dashboard::routes::dashboard_router(&state.access))
        .merge(api::reference::routes::reference_router())
        .route("/", get(|| async { Redirect::to(auth::access::PROTECTED_ROOT) }))
        .route("/healthz", get(|| async { "ok" }))
        .fallback(|| async { StatusCode::NOT_FOUND })
        .layer(from_fn_with_state(state.clone(), auth::middleware::route_guard))
        .layer(from_fn(middleware::request_tracing))
        .with_state(state)
}
