//! reqwest-backed implementation of the `ConductApi` trait.
//!
//! This file contains the HTTP client wrapper for the conduct-score backend:
//! endpoint URL construction, credential forwarding and response decoding.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, COOKIE};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::errors::AdapterError;
use crate::models::{
    Class, ClassesEnvelope, FacultiesEnvelope, Faculty, IssuedToken, LoginCredentials,
    RemoteIdentity,
};
use crate::ConductApi;

const IDENTITY_PATH: &str = "api/auth/me";
const LOGIN_PATH: &str = "api/auth/login";
const FACULTIES_PATH: &str = "api/faculties";
const CLASSES_PATH: &str = "api/classes";

/// Name of the cookie carrying the session credential, upstream and downstream.
pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, Clone)]
pub struct HttpConductApi {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpConductApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AdapterError> {
        // A trailing slash keeps `Url::join` from dropping the last path segment.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url =
            Url::parse(&normalized).map_err(|e| AdapterError::InvalidBaseUrl(e.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(AdapterError::InvalidBaseUrl(format!(
                "unsupported scheme {}",
                base_url.scheme()
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AdapterError::Transport(e.to_string()))?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, AdapterError> {
        self.base_url
            .join(path)
            .map_err(|e| AdapterError::InvalidBaseUrl(e.to_string()))
    }

    fn session_headers(token: &str) -> Result<HeaderMap, AdapterError> {
        let mut headers = HeaderMap::new();
        let cookie = HeaderValue::from_str(&format!("{TOKEN_COOKIE}={token}"))
            .map_err(|_| AdapterError::Unauthorized)?;
        let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| AdapterError::Unauthorized)?;
        headers.insert(COOKIE, cookie);
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &'static str,
        token: &str,
    ) -> Result<T, AdapterError> {
        let url = self.endpoint(path)?;
        let resp = self
            .client
            .get(url)
            .headers(Self::session_headers(token)?)
            .send()
            .await
            .map_err(|e| AdapterError::Transport(e.to_string()))?;
        Self::decode(path, resp).await
    }

    async fn decode<T: DeserializeOwned>(
        endpoint: &'static str,
        resp: reqwest::Response,
    ) -> Result<T, AdapterError> {
        let status = resp.status();
        debug!(endpoint, status = status.as_u16(), "upstream response");
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AdapterError::Unauthorized);
        }
        if !status.is_success() {
            return Err(AdapterError::Status {
                status: status.as_u16(),
                endpoint,
            });
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| AdapterError::Transport(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| AdapterError::Decode {
            endpoint,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl ConductApi for HttpConductApi {
    #[instrument(name = "upstream_current_identity", skip_all)]
    async fn current_identity(&self, token: &str) -> Result<RemoteIdentity, AdapterError> {
        self.get_json(IDENTITY_PATH, token).await
    }

    #[instrument(name = "upstream_faculties", skip_all)]
    async fn faculties(&self, token: &str) -> Result<Vec<Faculty>, AdapterError> {
        let envelope: FacultiesEnvelope = self.get_json(FACULTIES_PATH, token).await?;
        Ok(envelope.faculties)
    }

    #[instrument(name = "upstream_classes", skip_all)]
    async fn classes(&self, token: &str) -> Result<Vec<Class>, AdapterError> {
        let envelope: ClassesEnvelope = self.get_json(CLASSES_PATH, token).await?;
        Ok(envelope.classes)
    }

    #[instrument(name = "upstream_login", skip_all, fields(username = %credentials.username))]
    async fn login(&self, credentials: &LoginCredentials) -> Result<IssuedToken, AdapterError> {
        let url = self.endpoint(LOGIN_PATH)?;
        let resp = self
            .client
            .post(url)
            .json(credentials)
            .send()
            .await
            .map_err(|e| AdapterError::Transport(e.to_string()))?;
        Self::decode(LOGIN_PATH, resp).await
    }
}
