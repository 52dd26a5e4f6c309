//! Per-session reference data (faculties and classes).
//!
//! A `ReferenceDataCache` is mounted the first time a session asks for
//! reference data. Mounting kicks off one load that fetches faculties and
//! classes concurrently; later `refresh` calls repeat that load. Readers
//! always get a complete `ReferenceSnapshot`: each load publishes a new
//! snapshot in a single swap, and a failed load never empties lists that a
//! previous load filled. All loads of a cache run under its cancellation
//! token, so unmounting the session drops whatever is still in flight.
//! The registry holds one cache per session credential and evicts sessions
//! whose credential has expired.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use conduct_adapters::{AdapterError, Class, ConductApi, Faculty};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceSnapshot {
    pub faculties: Vec<Faculty>,
    pub classes: Vec<Class>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ReferenceSnapshot {
    fn pending() -> Self {
        Self {
            faculties: Vec::new(),
            classes: Vec::new(),
            loading: true,
            error: None,
        }
    }

    /// Classes belonging to `faculty_id`; nothing when no faculty is selected.
    pub fn filtered_classes(&self, faculty_id: Option<i64>) -> Vec<Class> {
        let Some(faculty_id) = faculty_id else {
            return Vec::new();
        };
        self.classes
            .iter()
            .filter(|class| class.faculty_id == Some(faculty_id))
            .cloned()
            .collect()
    }
}

pub struct ReferenceDataCache {
    api: Arc<dyn ConductApi>,
    token: String,
    current: watch::Sender<Arc<ReferenceSnapshot>>,
    load_lock: tokio::sync::Mutex<()>,
    cancel: CancellationToken,
}

impl ReferenceDataCache {
    /// Creates the cache and starts its initial load in the background.
    pub fn mount(
        api: Arc<dyn ConductApi>,
        token: String,
        cancel: CancellationToken,
    ) -> Arc<Self> {
        let (current, _) = watch::channel(Arc::new(ReferenceSnapshot::pending()));
        let cache = Arc::new(Self {
            api,
            token,
            current,
            load_lock: tokio::sync::Mutex::new(()),
            cancel,
        });
        let loader = Arc::clone(&cache);
        tokio::spawn(async move {
            loader.refresh().await;
        });
        cache
    }

    pub fn provide(&self) -> Arc<ReferenceSnapshot> {
        self.current.borrow().clone()
    }

    /// Waits for the initial load to settle. Returns early if unmounted.
    pub async fn wait_ready(&self) -> Arc<ReferenceSnapshot> {
        let mut rx = self.current.subscribe();
        tokio::select! {
            _ = self.cancel.cancelled() => {}
            _ = async {
                let _ = rx.wait_for(|snapshot| !snapshot.loading).await;
            } => {}
        }
        self.provide()
    }

    pub fn filtered_classes(&self, faculty_id: Option<i64>) -> Vec<Class> {
        self.provide().filtered_classes(faculty_id)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn unmount(&self) {
        self.cancel.cancel();
    }

    /// Re-fetches both lists and publishes the result in one swap.
    ///
    /// Concurrent callers are serialized, so only one load writes at a time.
    pub async fn refresh(&self) -> Arc<ReferenceSnapshot> {
        let _load = self.load_lock.lock().await;
        if self.cancel.is_cancelled() {
            return self.provide();
        }

        let fetched = tokio::select! {
            _ = self.cancel.cancelled() => None,
            batch = self.fetch_batch() => Some(batch),
        };

        let Some(batch) = fetched else {
            debug!("reference data load cancelled");
            return self.provide();
        };

        let previous = self.provide();
        let next = match batch {
            Ok((faculties, classes)) => {
                info!(
                    faculties = faculties.len(),
                    classes = classes.len(),
                    "reference data loaded"
                );
                ReferenceSnapshot {
                    faculties,
                    classes,
                    loading: false,
                    error: None,
                }
            }
            Err(err) => {
                warn!(kind = err.kind(), error = %err, "reference data unavailable");
                ReferenceSnapshot {
                    faculties: previous.faculties.clone(),
                    classes: previous.classes.clone(),
                    loading: false,
                    error: Some(format!("reference data unavailable: {err}")),
                }
            }
        };
        let next = Arc::new(next);
        self.current.send_replace(Arc::clone(&next));
        next
    }

    async fn fetch_batch(&self) -> Result<(Vec<Faculty>, Vec<Class>), AdapterError> {
        let (faculties, classes) = tokio::join!(
            self.api.faculties(&self.token),
            self.api.classes(&self.token)
        );
        Ok((faculties?, classes?))
    }
}

struct SessionEntry {
    subject_id: String,
    expires_at: i64,
    cache: Arc<ReferenceDataCache>,
}

/// One reference-data cache per session credential.
///
/// Entries are keyed by the raw credential, so a subject signed in from two
/// browsers holds two caches. Entries whose credential has expired are
/// dropped on the next mount.
pub struct ReferenceDataRegistry {
    api: Arc<dyn ConductApi>,
    sessions: Mutex<HashMap<String, SessionEntry>>,
    root: CancellationToken,
}

impl ReferenceDataRegistry {
    pub fn new(api: Arc<dyn ConductApi>) -> Self {
        Self {
            api,
            sessions: Mutex::new(HashMap::new()),
            root: CancellationToken::new(),
        }
    }

    /// Returns the cache for `token`, mounting one if needed.
    pub fn get_or_mount(
        &self,
        subject_id: &str,
        token: &str,
        expires_at: i64,
    ) -> Arc<ReferenceDataCache> {
        self.get_or_mount_at(subject_id, token, expires_at, Utc::now().timestamp())
    }

    pub fn get_or_mount_at(
        &self,
        subject_id: &str,
        token: &str,
        expires_at: i64,
        now: i64,
    ) -> Arc<ReferenceDataCache> {
        let mut sessions = self.sessions.lock();
        Self::sweep_locked(&mut sessions, now);
        if let Some(entry) = sessions.get(token) {
            if !entry.cache.is_cancelled() {
                return Arc::clone(&entry.cache);
            }
        }
        debug!(subject = %subject_id, "mounting reference data");
        let cache = ReferenceDataCache::mount(
            Arc::clone(&self.api),
            token.to_string(),
            self.root.child_token(),
        );
        sessions.insert(
            token.to_string(),
            SessionEntry {
                subject_id: subject_id.to_string(),
                expires_at,
                cache: Arc::clone(&cache),
            },
        );
        cache
    }

    pub fn get(&self, token: &str) -> Option<Arc<ReferenceDataCache>> {
        self.sessions
            .lock()
            .get(token)
            .map(|entry| Arc::clone(&entry.cache))
    }

    /// Drops the cache mounted for `token` and cancels its in-flight loads.
    pub fn unmount(&self, token: &str) -> bool {
        match self.sessions.lock().remove(token) {
            Some(entry) => {
                entry.cache.unmount();
                debug!(subject = %entry.subject_id, "reference data unmounted");
                true
            }
            None => false,
        }
    }

    /// Drops every entry whose credential expired before `now`.
    pub fn sweep_expired(&self, now: i64) -> usize {
        Self::sweep_locked(&mut self.sessions.lock(), now)
    }

    fn sweep_locked(sessions: &mut HashMap<String, SessionEntry>, now: i64) -> usize {
        let before = sessions.len();
        sessions.retain(|_, entry| {
            let live = now <= entry.expires_at && !entry.cache.is_cancelled();
            if !live {
                entry.cache.unmount();
                debug!(subject = %entry.subject_id, "expired reference data evicted");
            }
            live
        });
        before - sessions.len()
    }

    pub fn mounted(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn shutdown(&self) {
        self.root.cancel();
        self.sessions.lock().clear();
    }
}
