//! Abstract session store trait.
//!
//! Sessions are volatile: a token maps to a user id until its TTL
//! elapses or it is removed by logout.  Expired entries behave exactly
//! like absent ones.

use std::future::Future;
use std::pin::Pin;

/// Async session store contract.
pub trait SessionStore: Send + Sync + 'static {
    /// Create a fresh session for `user_id` and return its opaque token.
    ///
    /// Multiple calls for the same user produce independent, equally
    /// valid tokens.
    fn login(
        &self,
        user_id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + '_>>;

    /// Resolve a token to its owning user id.
    ///
    /// Returns `None` for unknown and expired tokens alike.
    fn resolve(
        &self,
        token: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<String>>> + Send + '_>>;

    /// Remove a session if present. Returns whether a removal occurred;
    /// a second logout on the same token is a no-op reporting `false`.
    fn logout(
        &self,
        token: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<bool>> + Send + '_>>;

    /// Liveness probe for the `/status` endpoint.
    fn ping(&self) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>>;
}
