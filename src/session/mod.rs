//! Session storage layer.
//!
//! Maps opaque login tokens to user identities with a fixed time-to-live.
//! The [`store::SessionStore`] trait defines the interface;
//! [`memory::MemorySessionStore`] is the volatile in-process implementation.

pub mod memory;
pub mod store;
