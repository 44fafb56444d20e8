//! Principal document schema
//!
//! Stores contributor/moderator credentials. The secret is stored only as
//! an Argon2id hash and is never serialized into API responses.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for principals
pub const USER_COLLECTION: &str = "users";

/// Role of a principal. Immutable after registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May submit content and read their own submissions
    #[default]
    Contributor,
    /// May additionally decide, delete, and list everything
    Moderator,
}

impl Role {
    pub fn is_moderator(self) -> bool {
        matches!(self, Role::Moderator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Contributor => write!(f, "contributor"),
            Role::Moderator => write!(f, "moderator"),
        }
    }
}

/// Principal document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct UserDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at)
    #[serde(default)]
    pub metadata: Metadata,

    /// Stable principal id, referenced by tokens and content items
    pub id: String,

    /// Unique handle, 3-30 characters
    pub username: String,

    /// Unique contact address, stored lowercased
    pub email: String,

    /// Argon2id secret hash
    pub password_hash: String,

    /// Principal role
    #[serde(default)]
    pub role: Role,
}

impl UserDoc {
    /// Create a new principal document with a fresh id
    pub fn new(username: &str, email: &str, password_hash: &str, role: Role) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            id: Uuid::new_v4().to_string(),
            username: username.trim().to_string(),
            email: email.trim().to_lowercase(),
            password_hash: password_hash.to_string(),
            role,
        }
    }
}

/// Principal summary safe for API responses (no secret hash).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<&UserDoc> for UserSummary {
    fn from(user: &UserDoc) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

impl IntoIndexes for UserDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("id_unique".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "username": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("username_unique".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "email": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("email_unique".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for UserDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_email() {
        let user = UserDoc::new(" alice ", " Alice@X.Test ", "$argon2-hash", Role::Contributor);
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@x.test");
        assert!(!user.id.is_empty());
    }

    #[test]
    fn test_summary_excludes_secret_hash() {
        let user = UserDoc::new("alice", "alice@x.test", "$argon2-hash", Role::Moderator);
        let json = serde_json::to_value(UserSummary::from(&user)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "moderator");
    }
}
