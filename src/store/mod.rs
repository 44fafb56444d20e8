//! Persistence seams for users and content
//!
//! Both stores have a MongoDB-backed implementation for production and an
//! in-memory implementation for dev mode and tests. List operations always
//! return newest-first by creation time.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;

use crate::db::schemas::{ContentDoc, ContentKind, ModerationStatus, UserDoc};
use crate::types::Result;

/// A moderation decision to apply to a content item
#[derive(Debug, Clone)]
pub struct Decision {
    pub status: ModerationStatus,
    pub reviewed_by: String,
    pub reviewed_at: bson::DateTime,
    pub rejection_reason: Option<String>,
}

/// Storage for registered user accounts
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist a new user. Fails with `Conflict` when the username or
    /// email is already taken.
    async fn create(&self, user: UserDoc) -> Result<UserDoc>;

    /// Look up a user by (lowercased) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserDoc>>;

    /// Look up a user by public id.
    async fn find_by_id(&self, id: &str) -> Result<Option<UserDoc>>;
}

/// Storage for submitted content items
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn insert(&self, item: ContentDoc) -> Result<ContentDoc>;

    async fn find_by_id(&self, id: &str) -> Result<Option<ContentDoc>>;

    /// Apply a moderation decision, returning the updated item or `None`
    /// when no item with that id exists.
    async fn apply_decision(&self, id: &str, decision: Decision) -> Result<Option<ContentDoc>>;

    /// Hard-delete an item. Returns `false` when nothing was deleted.
    async fn delete(&self, id: &str) -> Result<bool>;

    async fn list_by_status(
        &self,
        kind: ContentKind,
        status: ModerationStatus,
    ) -> Result<Vec<ContentDoc>>;

    async fn list_by_submitter(
        &self,
        submitter: &str,
        kind: Option<ContentKind>,
    ) -> Result<Vec<ContentDoc>>;

    async fn list_all(&self, kind: Option<ContentKind>) -> Result<Vec<ContentDoc>>;
}
