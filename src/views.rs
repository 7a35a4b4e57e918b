//! Response view types.
//!
//! One explicit result structure per operation, reused everywhere that
//! operation's result is returned, so every endpoint renders the same
//! shape for the same concept.

use serde::Serialize;
use utoipa::ToSchema;

use crate::metadata::store::{FileRecord, UserRecord};

/// Node metadata as returned by create/show/list/publish operations.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileView {
    /// Node id.
    pub id: String,
    /// Owning user id.
    pub owner_id: String,
    /// Display name.
    pub name: String,
    /// Node kind: `folder`, `file`, or `image`.
    pub kind: String,
    /// Whether unauthenticated content reads are allowed.
    pub is_public: bool,
    /// Parent id, or the literal `root`.
    pub parent_id: String,
}

impl From<&FileRecord> for FileView {
    fn from(record: &FileRecord) -> Self {
        FileView {
            id: record.id.clone(),
            owner_id: record.owner_id.clone(),
            name: record.name.clone(),
            kind: record.kind.as_str().to_string(),
            is_public: record.is_public,
            parent_id: record.parent.as_token().to_string(),
        }
    }
}

/// User identity as returned by register and whoami.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserView {
    /// User id.
    pub id: String,
    /// Registered email.
    pub email: String,
}

impl From<&UserRecord> for UserView {
    fn from(record: &UserRecord) -> Self {
        UserView {
            id: record.id.clone(),
            email: record.email.clone(),
        }
    }
}

/// Session token as returned by login.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenView {
    /// Opaque session token.
    pub token: String,
}

/// Backend liveness as returned by `/status`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusView {
    /// Session store liveness.
    pub sessions: bool,
    /// Metadata store liveness.
    pub index: bool,
}

/// Entity counts as returned by `/stats`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatsView {
    /// Number of registered users.
    pub users: u64,
    /// Number of file tree nodes.
    pub files: u64,
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::store::{now_iso8601, FileKind, ParentRef};

    #[test]
    fn test_file_view_wire_shape() {
        let record = FileRecord {
            id: "id-1".to_string(),
            owner_id: "owner-1".to_string(),
            name: "note.txt".to_string(),
            kind: FileKind::File,
            parent: ParentRef::Root,
            is_public: false,
            content_ref: Some("ref-1".to_string()),
            created_at: now_iso8601(),
        };

        let json = serde_json::to_value(FileView::from(&record)).unwrap();
        assert_eq!(json["id"], "id-1");
        assert_eq!(json["ownerId"], "owner-1");
        assert_eq!(json["kind"], "file");
        assert_eq!(json["isPublic"], false);
        assert_eq!(json["parentId"], "root");
        // The content reference is internal and never serialized.
        assert!(json.get("contentRef").is_none());
    }

    #[test]
    fn test_file_view_nested_parent() {
        let record = FileRecord {
            id: "id-2".to_string(),
            owner_id: "owner-1".to_string(),
            name: "docs".to_string(),
            kind: FileKind::Folder,
            parent: ParentRef::Node("id-1".to_string()),
            is_public: true,
            content_ref: None,
            created_at: now_iso8601(),
        };

        let json = serde_json::to_value(FileView::from(&record)).unwrap();
        assert_eq!(json["parentId"], "id-1");
        assert_eq!(json["kind"], "folder");
        assert_eq!(json["isPublic"], true);
    }

    #[test]
    fn test_user_view_hides_password_hash() {
        let record = UserRecord {
            id: "u-1".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: now_iso8601(),
        };

        let json = serde_json::to_string(&UserView::from(&record)).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("a@x.com"));
    }
}
