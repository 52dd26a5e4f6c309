//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! the listen address, the credential signing secret, the upstream REST
//! backend location and the cookie and routing switches. Values come from
//! `CONDUCT_*` environment variables; tests build `AppConfig` directly.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::auth::access::AccessTable;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub upstream_url: String,
    pub upstream_timeout: Duration,
    pub cookie_secure: bool,
    pub extended_roles: bool,
    pub preserve_return_path: bool,
}

impl AppConfig {
    pub fn new(jwt_secret: impl Into<String>, upstream_url: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            jwt_secret: jwt_secret.into(),
            upstream_url: upstream_url.into(),
            upstream_timeout: Duration::from_secs(10),
            cookie_secure: false,
            extended_roles: false,
            preserve_return_path: false,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("CONDUCT_JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("CONDUCT_JWT_SECRET"))?;
        let upstream_url = lookup("CONDUCT_UPSTREAM_URL")
            .unwrap_or_else(|| "http://127.0.0.1:8080".to_string());

        let mut config = Self::new(jwt_secret, upstream_url);
        if let Some(raw) = lookup("CONDUCT_BIND_ADDR") {
            config.bind_addr = raw.parse().map_err(|_| ConfigError::Invalid {
                name: "CONDUCT_BIND_ADDR",
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = lookup("CONDUCT_UPSTREAM_TIMEOUT_MS") {
            let ms = raw.parse::<u64>().map_err(|_| ConfigError::Invalid {
                name: "CONDUCT_UPSTREAM_TIMEOUT_MS",
                value: raw.clone(),
            })?;
            config.upstream_timeout = Duration::from_millis(ms);
        }
        config.cookie_secure = flag(&lookup, "CONDUCT_COOKIE_SECURE", false)?;
        config.extended_roles = flag(&lookup, "CONDUCT_EXTENDED_ROLES", false)?;
        config.preserve_return_path = flag(&lookup, "CONDUCT_PRESERVE_RETURN_PATH", false)?;
        Ok(config)
    }

    pub fn access_table(&self) -> AccessTable {
        if self.extended_roles {
            AccessTable::extended()
        } else {
            AccessTable::standard()
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("upstream_url", &self.upstream_url)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("cookie_secure", &self.cookie_secure)
            .field("extended_roles", &self.extended_roles)
            .field("preserve_return_path", &self.preserve_return_path)
            .finish()
    }
}

fn flag<F>(lookup: &F, name: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "TRUE" | "yes" | "YES") => Ok(true),
        Some("0" | "false" | "FALSE" | "no" | "NO") => Ok(false),
        Some(other) => Err(ConfigError::Invalid {
            name,
            value: other.to_string(),
        }),
    }
}
