//! Abstract metadata store trait and record types.
//!
//! Any metadata backend must implement [`MetadataStore`].  The trait
//! uses `async_trait`-style methods (manual desugaring with pinned
//! futures) so it can be shared between the in-memory and SQLite
//! implementations behind `Arc<dyn MetadataStore>`.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// Default number of children returned per listing page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Wire token for the root parent sentinel.
///
/// Distinct from any generated identifier: node ids are UUIDs and can
/// never equal this literal.
pub const ROOT_TOKEN: &str = "root";

// ── Record types ───────────────────────────────────────────────────

/// A registered user. Immutable after creation.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Generated UUID.
    pub id: String,
    /// Unique email, matched exactly (case-sensitive).
    pub email: String,
    /// Argon2id PHC hash. The plaintext is never stored.
    pub password_hash: String,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
}

/// The kind of a file node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// A container for other nodes. Never carries content.
    Folder,
    /// A regular file.
    File,
    /// An image file.
    Image,
}

impl FileKind {
    /// The wire string for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Folder => "folder",
            FileKind::File => "file",
            FileKind::Image => "image",
        }
    }

    /// Parse a wire string. Unrecognized kinds are `None`.
    pub fn parse(s: &str) -> Option<FileKind> {
        match s {
            "folder" => Some(FileKind::Folder),
            "file" => Some(FileKind::File),
            "image" => Some(FileKind::Image),
            _ => None,
        }
    }
}

/// Reference to a node's parent: either the root sentinel or a folder id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentRef {
    /// Top level of the owner's tree.
    Root,
    /// A specific folder node.
    Node(String),
}

impl ParentRef {
    /// Parse a wire token: the literal `"root"` or a node id.
    pub fn from_token(token: &str) -> ParentRef {
        if token == ROOT_TOKEN {
            ParentRef::Root
        } else {
            ParentRef::Node(token.to_string())
        }
    }

    /// The wire/storage token for this reference.
    pub fn as_token(&self) -> &str {
        match self {
            ParentRef::Root => ROOT_TOKEN,
            ParentRef::Node(id) => id,
        }
    }

    /// Whether this is the root sentinel.
    pub fn is_root(&self) -> bool {
        matches!(self, ParentRef::Root)
    }
}

/// Metadata record for a file tree node.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Generated UUID, unique and never reused.
    pub id: String,
    /// Owning user. Immutable; ownership never transfers.
    pub owner_id: String,
    /// Display name, non-empty.
    pub name: String,
    /// Node kind.
    pub kind: FileKind,
    /// Parent reference. Non-root parents must be existing folders,
    /// validated before insertion.
    pub parent: ParentRef,
    /// Whether unauthenticated content reads are allowed.
    pub is_public: bool,
    /// Content store key. `Some` exactly when `kind != Folder`.
    pub content_ref: Option<String>,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
}

// ── Timestamps ─────────────────────────────────────────────────────

/// Get the current time as an ISO-8601 string, the format used for
/// record `created_at` fields.
pub fn now_iso8601() -> String {
    let now = std::time::SystemTime::now();
    let since_epoch = now
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = since_epoch.as_secs();
    let millis = since_epoch.subsec_millis();

    let days = secs / 86400;
    let day_secs = secs % 86400;
    let hours = day_secs / 3600;
    let minutes = (day_secs % 3600) / 60;
    let seconds = day_secs % 60;

    let (year, month, day) = days_to_ymd(days);

    format!("{year:04}-{month:02}-{day:02}T{hours:02}:{minutes:02}:{seconds:02}.{millis:03}Z")
}

/// Convert days since Unix epoch to (year, month, day).
fn days_to_ymd(days: u64) -> (i32, u32, u32) {
    let z = days as i64 + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if m <= 2 { y + 1 } else { y };
    (year as i32, m as u32, d as u32)
}

// ── Trait ───────────────────────────────────────────────────────────

/// Async metadata store contract.
///
/// Implementations return `anyhow::Result` at this boundary; the
/// operations layer converts failures into the public error taxonomy.
pub trait MetadataStore: Send + Sync + 'static {
    // ── Users ───────────────────────────────────────────────────────

    /// Insert a new user record. Fails if the email is already taken.
    fn create_user(
        &self,
        record: UserRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>>;

    /// Look up a user by exact email match.
    fn find_user_by_email(
        &self,
        email: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<UserRecord>>> + Send + '_>>;

    /// Get a user by id.
    fn get_user(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<UserRecord>>> + Send + '_>>;

    /// Count all registered users.
    fn count_users(&self) -> Pin<Box<dyn Future<Output = anyhow::Result<u64>> + Send + '_>>;

    // ── Files ───────────────────────────────────────────────────────

    /// Insert a new file record. Ids are unique; inserting a duplicate
    /// id is an error.
    fn insert_file(
        &self,
        record: FileRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>>;

    /// Get a file record by id, regardless of owner.
    fn get_file(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<FileRecord>>> + Send + '_>>;

    /// Get a file record by id, only if `owner_id` matches.
    fn get_file_owned(
        &self,
        id: &str,
        owner_id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<FileRecord>>> + Send + '_>>;

    /// List direct children of `parent` owned by `owner_id`, in insertion
    /// order, paginated with `skip = page * page_size`. Out-of-range pages
    /// yield an empty vec, never an error.
    fn list_children(
        &self,
        owner_id: &str,
        parent: &ParentRef,
        page: u32,
        page_size: u32,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<FileRecord>>> + Send + '_>>;

    /// Set `is_public` on a node, only if it exists and `owner_id`
    /// matches. Returns the updated record, or `None` when the node is
    /// absent or owned by someone else (indistinguishable by design).
    fn set_visibility(
        &self,
        id: &str,
        owner_id: &str,
        is_public: bool,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<FileRecord>>> + Send + '_>>;

    /// Count all file records.
    fn count_files(&self) -> Pin<Box<dyn Future<Output = anyhow::Result<u64>> + Send + '_>>;

    /// Liveness probe for the `/status` endpoint.
    fn ping(&self) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>>;
}

// ── Tests ───────────────────────────────────────────────────────────
