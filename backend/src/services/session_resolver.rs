//! Picks the landing dashboard for an authenticated session.
//!
//! The resolver asks the backend who the session belongs to exactly once and
//! branches on the reported role. Any failure sends the caller back to the
//! login page; there is no retry.

use std::sync::Arc;

use conduct_adapters::ConductApi;
use tracing::{debug, warn};

use crate::auth::access::AccessTable;
use crate::auth::middleware::LOGIN_PATH;
use crate::auth::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Dashboard(&'static str),
    Login,
}

impl Navigation {
    pub fn location(&self) -> &'static str {
        match self {
            Navigation::Dashboard(path) => path,
            Navigation::Login => LOGIN_PATH,
        }
    }
}

#[derive(Clone)]
pub struct SessionResolver {
    api: Arc<dyn ConductApi>,
    access: Arc<AccessTable>,
}

impl SessionResolver {
    pub fn new(api: Arc<dyn ConductApi>, access: Arc<AccessTable>) -> Self {
        Self { api, access }
    }

    pub async fn resolve(&self, token: &str) -> Navigation {
        let remote = match self.api.current_identity(token).await {
            Ok(remote) => remote,
            Err(err) => {
                warn!(kind = err.kind(), error = %err, "identity lookup failed");
                return Navigation::Login;
            }
        };
        let Ok(role) = remote.role.parse::<Role>() else {
            warn!(role = %remote.role, "backend reported an unknown role");
            return Navigation::Login;
        };
        let navigation = self
            .access
            .dashboard_for(role)
            .map(Navigation::Dashboard)
            .unwrap_or(Navigation::Login);
        debug!(subject = %remote.subject_id, %role, to = navigation.location(), "session resolved");
        navigation
    }
}
