//! Metadata storage layer.
//!
//! The metadata store keeps track of registered users and the per-user
//! file tree.  The [`store::MetadataStore`] trait defines the interface;
//! [`sqlite::SqliteMetadataStore`] is the durable default and
//! [`memory::MemoryMetadataStore`] backs tests and ephemeral runs.

pub mod memory;
pub mod sqlite;
pub mod store;
