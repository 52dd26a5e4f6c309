//! In-memory stand-in for the conduct-score REST backend.
//!
//! `FakeConductApi` serves canned identity, faculty and class data, counts
//! upstream calls and can be told to fail or stall reference fetches. The
//! unit tests and the `tests/` suites build the router on top of it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use conduct_adapters::{
    AdapterError, Class, ConductApi, Faculty, IssuedToken, LoginCredentials, RemoteIdentity,
};
use parking_lot::Mutex;

pub struct FakeConductApi {
    /// `None` answers identity lookups with 401.
    pub identity: Mutex<Option<RemoteIdentity>>,
    pub faculties: Mutex<Vec<Faculty>>,
    pub classes: Mutex<Vec<Class>>,
    /// username -> (password, issued token)
    pub accounts: Mutex<HashMap<String, (String, String)>>,
    pub fail_reference: AtomicBool,
    pub identity_calls: AtomicU64,
    pub reference_calls: AtomicU64,
    pub reference_delay_ms: AtomicU64,
}

impl Default for FakeConductApi {
    fn default() -> Self {
        Self {
            identity: Mutex::new(None),
            faculties: Mutex::new(Vec::new()),
            classes: Mutex::new(Vec::new()),
            accounts: Mutex::new(HashMap::new()),
            fail_reference: AtomicBool::new(false),
            identity_calls: AtomicU64::new(0),
            reference_calls: AtomicU64::new(0),
            reference_delay_ms: AtomicU64::new(0),
        }
    }
}

impl FakeConductApi {
    pub fn with_identity(role: &str, subject_id: &str) -> Self {
        let api = Self::default();
        *api.identity.lock() = Some(RemoteIdentity {
            role: role.to_string(),
            subject_id: subject_id.to_string(),
        });
        api
    }

    async fn reference_round_trip(&self) -> Result<(), AdapterError> {
        self.reference_calls.fetch_add(1, Ordering::Relaxed);
        let delay = self.reference_delay_ms.load(Ordering::Relaxed);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_reference.load(Ordering::Relaxed) {
            return Err(AdapterError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ConductApi for FakeConductApi {
    async fn current_identity(&self, _token: &str) -> Result<RemoteIdentity, AdapterError> {
        self.identity_calls.fetch_add(1, Ordering::Relaxed);
        self.identity.lock().clone().ok_or(AdapterError::Unauthorized)
    }

    async fn faculties(&self, _token: &str) -> Result<Vec<Faculty>, AdapterError> {
        self.reference_round_trip().await?;
        Ok(self.faculties.lock().clone())
    }

    async fn classes(&self, _token: &str) -> Result<Vec<Class>, AdapterError> {
        self.reference_round_trip().await?;
        Ok(self.classes.lock().clone())
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<IssuedToken, AdapterError> {
        match self.accounts.lock().get(&credentials.username) {
            Some((password, token)) if *password == credentials.password => Ok(IssuedToken {
                token: token.clone(),
            }),
            _ => Err(AdapterError::Unauthorized),
        }
    }
}
