//! In-memory content backend.
//!
//! Holds content in a `RwLock<HashMap>` with no persistence. Useful for
//! tests and ephemeral deployments.

use bytes::Bytes;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::RwLock;

use super::backend::ContentStore;

/// Content store holding all bytes in process memory.
pub struct MemoryContentStore {
    inner: RwLock<HashMap<String, Bytes>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStore for MemoryContentStore {
    fn write(
        &self,
        data: Bytes,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + '_>> {
        Box::pin(async move {
            let content_ref = uuid::Uuid::new_v4().to_string();
            let mut inner = self.inner.write().expect("rwlock poisoned");
            inner.insert(content_ref.clone(), data);
            Ok(content_ref)
        })
    }

    fn read(
        &self,
        content_ref: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Bytes>>> + Send + '_>> {
        let content_ref = content_ref.to_string();
        Box::pin(async move {
            let inner = self.inner.read().expect("rwlock poisoned");
            Ok(inner.get(&content_ref).cloned())
        })
    }

    fn exists(
        &self,
        content_ref: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<bool>> + Send + '_>> {
        let content_ref = content_ref.to_string();
        Box::pin(async move {
            let inner = self.inner.read().expect("rwlock poisoned");
            Ok(inner.contains_key(&content_ref))
        })
    }
}

// ── Tests ───────────────────────────────────────────────────────────
