//! In-memory session store.
//!
//! Tokens live in a `RwLock<HashMap>` with per-entry expiry instants.
//! Expiry is lazy: a stale entry is dropped the first time it is touched
//! after its deadline; no background sweep runs.  The `*_at` methods
//! take an explicit "now" so tests can simulate TTL elapse without
//! sleeping.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use super::store::SessionStore;

#[derive(Debug)]
struct SessionEntry {
    user_id: String,
    expires_at: Instant,
}

/// Volatile token → user map with a fixed TTL.
pub struct MemorySessionStore {
    ttl: Duration,
    inner: RwLock<HashMap<String, SessionEntry>>,
}

impl MemorySessionStore {
    /// Create a store whose tokens expire `ttl` after creation.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Generate a fresh opaque token.
    fn generate_token() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Create a session as of `now`.
    pub fn login_at(&self, user_id: &str, now: Instant) -> String {
        let token = Self::generate_token();
        let entry = SessionEntry {
            user_id: user_id.to_string(),
            expires_at: now + self.ttl,
        };
        let mut inner = self.inner.write().expect("rwlock poisoned");
        inner.insert(token.clone(), entry);
        token
    }

    /// Resolve a token as of `now`, dropping it if expired.
    pub fn resolve_at(&self, token: &str, now: Instant) -> Option<String> {
        let mut expired = false;
        let resolved = {
            let inner = self.inner.read().expect("rwlock poisoned");
            match inner.get(token) {
                Some(entry) if entry.expires_at > now => Some(entry.user_id.clone()),
                Some(_) => {
                    expired = true;
                    None
                }
                None => None,
            }
        };
        if expired {
            self.inner
                .write()
                .expect("rwlock poisoned")
                .remove(token);
        }
        resolved
    }

    /// Remove a session. Returns whether an entry was present.
    pub fn remove(&self, token: &str) -> bool {
        self.inner
            .write()
            .expect("rwlock poisoned")
            .remove(token)
            .is_some()
    }
}

impl SessionStore for MemorySessionStore {
    fn login(
        &self,
        user_id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + '_>> {
        let user_id = user_id.to_string();
        Box::pin(async move { Ok(self.login_at(&user_id, Instant::now())) })
    }

    fn resolve(
        &self,
        token: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<String>>> + Send + '_>> {
        let token = token.to_string();
        Box::pin(async move { Ok(self.resolve_at(&token, Instant::now())) })
    }

    fn logout(
        &self,
        token: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<bool>> + Send + '_>> {
        let token = token.to_string();
        Box::pin(async move { Ok(self.remove(&token)) })
    }

    fn ping(&self) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move { Ok(()) })
    }
}

// ── Tests ───────────────────────────────────────────────────────────
