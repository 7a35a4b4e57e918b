//! Abstract content store trait.
//!
//! Every content backend must implement [`ContentStore`].  The trait
//! works in terms of opaque byte buffers and opaque references so
//! callers do not need to know the underlying medium.
//!
//! Ordering contract: callers write content FIRST and insert the index
//! row referencing it afterwards, so an index entry is never observed
//! without its bytes.

use bytes::Bytes;
use std::future::Future;
use std::pin::Pin;

/// Async content store contract.
pub trait ContentStore: Send + Sync + 'static {
    /// Persist `data` durably under a freshly allocated reference and
    /// return that reference.
    fn write(
        &self,
        data: Bytes,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + '_>>;

    /// Read the full content at `content_ref`.
    ///
    /// Returns `None` when the reference does not resolve to stored
    /// bytes; the caller decides how to surface that.
    fn read(
        &self,
        content_ref: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Bytes>>> + Send + '_>>;

    /// Check whether `content_ref` resolves to stored bytes.
    fn exists(
        &self,
        content_ref: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<bool>> + Send + '_>>;
}
