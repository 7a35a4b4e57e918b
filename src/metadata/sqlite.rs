//! SQLite-backed metadata store.
//!
//! Uses `rusqlite` with the `bundled` feature so no system SQLite
//! library is required.  All async trait methods are thin wrappers
//! around synchronous rusqlite calls executed under a `Mutex`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::store::{
    now_iso8601, FileKind, FileRecord, MetadataStore, ParentRef, UserRecord,
};

/// Current schema version. Bumped when migrations are added.
const SCHEMA_VERSION: i64 = 1;

/// Metadata store backed by a single SQLite database file.
pub struct SqliteMetadataStore {
    /// The database connection, guarded by a mutex for Send + Sync.
    conn: Mutex<Connection>,
}

impl SqliteMetadataStore {
    /// Open (or create) the database at `path` and initialize the schema.
    ///
    /// Passing `":memory:"` creates an in-memory database (useful for tests).
    pub fn new(path: &str) -> anyhow::Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.apply_pragmas()?;
        store.init_db()?;
        Ok(store)
    }

    /// Apply recommended SQLite pragmas for performance and safety.
    fn apply_pragmas(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().expect("mutex poisoned");
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
            ",
        )?;
        Ok(())
    }

    /// Create the required tables and indexes if they do not already exist.
    /// This is idempotent -- safe to call on every startup.
    fn init_db(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().expect("mutex poisoned");
        conn.execute_batch(
            "
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version    INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );

            -- Users
            CREATE TABLE IF NOT EXISTS users (
                id            TEXT PRIMARY KEY,
                email         TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at    TEXT NOT NULL
            );

            -- File tree nodes
            CREATE TABLE IF NOT EXISTS files (
                id          TEXT PRIMARY KEY,
                owner_id    TEXT NOT NULL,
                name        TEXT NOT NULL,
                kind        TEXT NOT NULL,
                parent      TEXT NOT NULL DEFAULT 'root',
                is_public   INTEGER NOT NULL DEFAULT 0,
                content_ref TEXT,
                created_at  TEXT NOT NULL,

                FOREIGN KEY (owner_id) REFERENCES users(id)
            );

            CREATE INDEX IF NOT EXISTS idx_files_owner_parent
                ON files(owner_id, parent);
            ",
        )?;

        // Record schema version if not already present.
        let existing: Option<i64> = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
                row.get(0)
            })
            .optional()?
            .flatten();

        if existing.is_none() || existing.unwrap() < SCHEMA_VERSION {
            let now = now_iso8601();
            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version, applied_at) VALUES (?1, ?2)",
                params![SCHEMA_VERSION, now],
            )?;
        }

        Ok(())
    }
}

/// Map a `files` row to a [`FileRecord`].
///
/// Column order: id, owner_id, name, kind, parent, is_public, content_ref,
/// created_at.
fn row_to_file(row: &Row<'_>) -> rusqlite::Result<FileRecord> {
    let kind_str: String = row.get(3)?;
    let kind = FileKind::parse(&kind_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown file kind: {kind_str}").into(),
        )
    })?;
    let parent_token: String = row.get(4)?;

    Ok(FileRecord {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        kind,
        parent: ParentRef::from_token(&parent_token),
        is_public: row.get::<_, i64>(5)? != 0,
        content_ref: row.get(6)?,
        created_at: row.get(7)?,
    })
}

const FILE_COLUMNS: &str = "id, owner_id, name, kind, parent, is_public, content_ref, created_at";

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: row.get(3)?,
    })
}

impl MetadataStore for SqliteMetadataStore {
    fn create_user(
        &self,
        record: UserRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move {
            let conn = self.conn.lock().expect("mutex poisoned");
            conn.execute(
                "INSERT INTO users (id, email, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.id,
                    record.email,
                    record.password_hash,
                    record.created_at
                ],
            )?;
            Ok(())
        })
    }

    fn find_user_by_email(
        &self,
        email: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<UserRecord>>> + Send + '_>> {
        let email = email.to_string();
        Box::pin(async move {
            let conn = self.conn.lock().expect("mutex poisoned");
            let user = conn
                .query_row(
                    "SELECT id, email, password_hash, created_at FROM users WHERE email = ?1",
                    params![email],
                    row_to_user,
                )
                .optional()?;
            Ok(user)
        })
    }

    fn get_user(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<UserRecord>>> + Send + '_>> {
        let id = id.to_string();
        Box::pin(async move {
            let conn = self.conn.lock().expect("mutex poisoned");
            let user = conn
                .query_row(
                    "SELECT id, email, password_hash, created_at FROM users WHERE id = ?1",
                    params![id],
                    row_to_user,
                )
                .optional()?;
            Ok(user)
        })
    }

    fn count_users(&self) -> Pin<Box<dyn Future<Output = anyhow::Result<u64>> + Send + '_>> {
        Box::pin(async move {
            let conn = self.conn.lock().expect("mutex poisoned");
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
            Ok(count as u64)
        })
    }

    fn insert_file(
        &self,
        record: FileRecord,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move {
            let conn = self.conn.lock().expect("mutex poisoned");
            conn.execute(
                "INSERT INTO files (id, owner_id, name, kind, parent, is_public, content_ref, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.id,
                    record.owner_id,
                    record.name,
                    record.kind.as_str(),
                    record.parent.as_token(),
                    record.is_public as i64,
                    record.content_ref,
                    record.created_at
                ],
            )?;
            Ok(())
        })
    }

    fn get_file(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<FileRecord>>> + Send + '_>> {
        let id = id.to_string();
        Box::pin(async move {
            let conn = self.conn.lock().expect("mutex poisoned");
            let file = conn
                .query_row(
                    &format!("SELECT {FILE_COLUMNS} FROM files WHERE id = ?1"),
                    params![id],
                    row_to_file,
                )
                .optional()?;
            Ok(file)
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
            let conn = self.conn.lock().expect("mutex poisoned");
            let file = conn
                .query_row(
                    &format!("SELECT {FILE_COLUMNS} FROM files WHERE id = ?1 AND owner_id = ?2"),
                    params![id, owner_id],
                    row_to_file,
                )
                .optional()?;
            Ok(file)
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
        let parent_token = parent.as_token().to_string();
        Box::pin(async move {
            let conn = self.conn.lock().expect("mutex poisoned");
            // rowid ascending preserves insertion order.
            let mut stmt = conn.prepare(&format!(
                "SELECT {FILE_COLUMNS} FROM files
                 WHERE owner_id = ?1 AND parent = ?2
                 ORDER BY rowid ASC
                 LIMIT ?3 OFFSET ?4"
            ))?;
            let files = stmt
                .query_map(
                    params![
                        owner_id,
                        parent_token,
                        page_size as i64,
                        page as i64 * page_size as i64
                    ],
                    row_to_file,
                )?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(files)
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
            let conn = self.conn.lock().expect("mutex poisoned");
            let changed = conn.execute(
                "UPDATE files SET is_public = ?1 WHERE id = ?2 AND owner_id = ?3",
                params![is_public as i64, id, owner_id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            let file = conn
                .query_row(
                    &format!("SELECT {FILE_COLUMNS} FROM files WHERE id = ?1"),
                    params![id],
                    row_to_file,
                )
                .optional()?;
            Ok(file)
        })
    }

    fn count_files(&self) -> Pin<Box<dyn Future<Output = anyhow::Result<u64>> + Send + '_>> {
        Box::pin(async move {
            let conn = self.conn.lock().expect("mutex poisoned");
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;
            Ok(count as u64)
        })
    }

    fn ping(&self) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move {
            let conn = self.conn.lock().expect("mutex poisoned");
            conn.query_row("SELECT 1", [], |_| Ok(()))?;
            Ok(())
        })
    }
}

// ── Tests ───────────────────────────────────────────────────────────
