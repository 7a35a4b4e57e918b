//! In-memory metadata store.
//!
//! Stores all metadata in memory with no persistence. Useful for testing
//! and ephemeral deployments. Uses `RwLock<Inner>` for thread-safe access;
//! records are held in insertion-ordered vectors so listing order falls
//! out of construction.

use std::future::Future;
use std::pin::Pin;
use std::sync::RwLock;

use super::store::{FileRecord, MetadataStore, ParentRef, UserRecord};

#[derive(Debug, Default)]
struct Inner {
    users: Vec<UserRecord>,
    files: Vec<FileRecord>,
}

/// Metadata store holding everything in process memory.
pub struct MemoryMetadataStore {
    inner: RwLock<Inner>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl Default for MemoryMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataStore for MemoryMetadataStore {
    fn create_user(
        &self,
        record: UserRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move {
            let mut inner = self.inner.write().expect("rwlock poisoned");
            if inner.users.iter().any(|u| u.email == record.email) {
                return Err(anyhow::anyhow!("email already registered: {}", record.email));
            }
            inner.users.push(record);
            Ok(())
        })
    }

    fn find_user_by_email(
        &self,
        email: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<UserRecord>>> + Send + '_>> {
        let email = email.to_string();
        Box::pin(async move {
            let inner = self.inner.read().expect("rwlock poisoned");
            Ok(inner.users.iter().find(|u| u.email == email).cloned())
        })
    }

    fn get_user(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<UserRecord>>> + Send + '_>> {
        let id = id.to_string();
        Box::pin(async move {
            let inner = self.inner.read().expect("rwlock poisoned");
            Ok(inner.users.iter().find(|u| u.id == id).cloned())
        })
    }

    fn count_users(&self) -> Pin<Box<dyn Future<Output = anyhow::Result<u64>> + Send + '_>> {
        Box::pin(async move {
            let inner = self.inner.read().expect("rwlock poisoned");
            Ok(inner.users.len() as u64)
        })
    }

    fn insert_file(
        &self,
        record: FileRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move {
            let mut inner = self.inner.write().expect("rwlock poisoned");
            if inner.files.iter().any(|f| f.id == record.id) {
                return Err(anyhow::anyhow!("duplicate file id: {}", record.id));
            }
            inner.files.push(record);
            Ok(())
        })
    }

    fn get_file(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<FileRecord>>> + Send + '_>> {
        let id = id.to_string();
        Box::pin(async move {
            let inner = self.inner.read().expect("rwlock poisoned");
            Ok(inner.files.iter().find(|f| f.id == id).cloned())
        })
    }

    fn get_file_owned(
        &self,
        id: &str,
        owner_id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<FileRecord>>> + Send + '_>> {
        let id = id.to_string();
        let owner_id = owner_id.to_string();
        Box::pin(async move {
            let inner = self.inner.read().expect("rwlock poisoned");
            Ok(inner
                .files
                .iter()
                .find(|f| f.id == id && f.owner_id == owner_id)
                .cloned())
        })
    }

    fn list_children(
        &self,
        owner_id: &str,
        parent: &ParentRef,
        page: u32,
        page_size: u32,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<FileRecord>>> + Send + '_>> {
        let owner_id = owner_id.to_string();
        let parent = parent.clone();
        Box::pin(async move {
            let inner = self.inner.read().expect("rwlock poisoned");
            let skip = page as usize * page_size as usize;
            Ok(inner
                .files
                .iter()
                .filter(|f| f.owner_id == owner_id && f.parent == parent)
                .skip(skip)
                .take(page_size as usize)
                .cloned()
                .collect())
        })
    }

    fn set_visibility(
        &self,
        id: &str,
        owner_id: &str,
        is_public: bool,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<FileRecord>>> + Send + '_>> {
        let id = id.to_string();
        let owner_id = owner_id.to_string();
        Box::pin(async move {
            let mut inner = self.inner.write().expect("rwlock poisoned");
            let found = inner
                .files
                .iter_mut()
                .find(|f| f.id == id && f.owner_id == owner_id);
            match found {
                Some(file) => {
                    file.is_public = is_public;
                    Ok(Some(file.clone()))
                }
                None => Ok(None),
            }
        })
    }

    fn count_files(&self) -> Pin<Box<dyn Future<Output = anyhow::Result<u64>> + Send + '_>> {
        Box::pin(async move {
            let inner = self.inner.read().expect("rwlock poisoned");
            Ok(inner.files.len() as u64)
        })
    }

    fn ping(&self) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move { Ok(()) })
    }
}

// ── Tests ───────────────────────────────────────────────────────────
