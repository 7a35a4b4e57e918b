//! Local filesystem content backend.
//!
//! Content is stored as flat UUID-named files under a configurable root
//! directory, created on first use.  References never contain path
//! separators, so a stored blob can never escape the root.
//!
//! All writes follow crash-only design: write to temp file, fsync, rename.

use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::pin::Pin;

use super::backend::ContentStore;

/// Stores content on the local filesystem.
pub struct LocalContentStore {
    /// Root directory for all stored content.
    root: PathBuf,
}

impl LocalContentStore {
    /// Create a new `LocalContentStore` rooted at `root`.
    ///
    /// The directory will be created if it does not exist.
    pub fn new(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        // Also create the .tmp directory for atomic writes.
        std::fs::create_dir_all(root.join(".tmp"))?;
        Ok(Self { root })
    }

    /// Resolve a content reference to an absolute file path.
    ///
    /// References are generated UUIDs; anything containing a path
    /// component separator is rejected outright.
    fn resolve(&self, content_ref: &str) -> anyhow::Result<PathBuf> {
        if content_ref.is_empty()
            || content_ref.contains('/')
            || content_ref.contains('\\')
            || content_ref.starts_with('.')
        {
            anyhow::bail!("invalid content reference: {content_ref}");
        }
        Ok(self.root.join(content_ref))
    }

    /// Generate a temp file path under .tmp/ for atomic writes.
    fn temp_path(&self) -> PathBuf {
        let id = uuid::Uuid::new_v4();
        self.root.join(".tmp").join(format!("tmp-{id}"))
    }
}

impl ContentStore for LocalContentStore {
    fn write(
        &self,
        data: Bytes,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + '_>> {
        Box::pin(async move {
            let content_ref = uuid::Uuid::new_v4().to_string();
            let final_path = self.resolve(&content_ref)?;

            let digest = hex::encode(Sha256::digest(&data));

            // Crash-only: temp-fsync-rename pattern.
            let tmp_path = self.temp_path();
            if let Some(parent) = tmp_path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let mut file = std::fs::File::create(&tmp_path)?;
            file.write_all(&data)?;
            file.sync_all()?; // fsync

            // Atomic rename to final path.
            std::fs::rename(&tmp_path, &final_path)?;

            tracing::debug!(
                content_ref,
                bytes = data.len(),
                sha256 = %digest,
                "content written"
            );

            Ok(content_ref)
        })
    }

    fn read(
        &self,
        content_ref: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Bytes>>> + Send + '_>> {
        let content_ref = content_ref.to_string();
        Box::pin(async move {
            let path = self.resolve(&content_ref)?;
            match std::fs::read(&path) {
                Ok(data) => Ok(Some(Bytes::from(data))),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn exists(
        &self,
        content_ref: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<bool>> + Send + '_>> {
        let content_ref = content_ref.to_string();
        Box::pin(async move {
            let path = self.resolve(&content_ref)?;
            Ok(path.is_file())
        })
    }
}

// ── Tests ───────────────────────────────────────────────────────────
