//! In-memory store implementations for dev mode and tests

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::db::schemas::{ContentDoc, ContentKind, ModerationStatus, UserDoc};
use crate::store::{ContentStore, CredentialStore, Decision};
use crate::types::{MemoriaError, Result};

/// User accounts held in process memory
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    users: RwLock<Vec<UserDoc>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn create(&self, mut user: UserDoc) -> Result<UserDoc> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.username == user.username) {
            return Err(MemoriaError::Conflict("Username already taken".to_string()));
        }
        if users.iter().any(|u| u.email == user.email) {
            return Err(MemoriaError::Conflict("Email already registered".to_string()));
        }

        user.metadata.created_at = Some(bson::DateTime::now());
        user.metadata.updated_at = Some(bson::DateTime::now());
        users.push(user.clone());

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserDoc>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserDoc>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }
}

/// Content items held in process memory
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    items: RwLock<Vec<ContentDoc>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest-first by creation time. Later inserts win ties so ordering
    /// stays stable when timestamps collide within a millisecond.
    fn newest_first(items: impl Iterator<Item = ContentDoc>) -> Vec<ContentDoc> {
        let mut out: Vec<ContentDoc> = items.collect();
        out.reverse();
        out.sort_by(|a, b| b.metadata.created_at.cmp(&a.metadata.created_at));
        out
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn insert(&self, mut item: ContentDoc) -> Result<ContentDoc> {
        let mut items = self.items.write().await;
        item.metadata.created_at = Some(bson::DateTime::now());
        item.metadata.updated_at = Some(bson::DateTime::now());
        items.push(item.clone());
        Ok(item)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ContentDoc>> {
        let items = self.items.read().await;
        Ok(items.iter().find(|i| i.id == id).cloned())
    }

    async fn apply_decision(&self, id: &str, decision: Decision) -> Result<Option<ContentDoc>> {
        let mut items = self.items.write().await;
        let Some(item) = items.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };

        item.status = decision.status;
        item.reviewed_by = Some(decision.reviewed_by);
        item.reviewed_at = Some(decision.reviewed_at);
        item.rejection_reason = decision.rejection_reason;
        item.metadata.updated_at = Some(bson::DateTime::now());

        Ok(Some(item.clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|i| i.id != id);
        Ok(items.len() < before)
    }

    async fn list_by_status(
        &self,
        kind: ContentKind,
        status: ModerationStatus,
    ) -> Result<Vec<ContentDoc>> {
        let items = self.items.read().await;
        Ok(Self::newest_first(
            items
                .iter()
                .filter(|i| i.kind() == kind && i.status == status)
                .cloned(),
        ))
    }

    async fn list_by_submitter(
        &self,
        submitter: &str,
        kind: Option<ContentKind>,
    ) -> Result<Vec<ContentDoc>> {
        let items = self.items.read().await;
        Ok(Self::newest_first(items.iter().filter(|i| {
            i.submitted_by == submitter && kind.map_or(true, |k| i.kind() == k)
        }).cloned()))
    }

    async fn list_all(&self, kind: Option<ContentKind>) -> Result<Vec<ContentDoc>> {
        let items = self.items.read().await;
        Ok(Self::newest_first(
            items
                .iter()
                .filter(|i| kind.map_or(true, |k| i.kind() == k))
                .cloned(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::{ContentPayload, Role, SongFields};

    fn song(title: &str, submitter: &str) -> ContentDoc {
        ContentDoc::new(
            ContentPayload::Song(SongFields {
                title: title.to_string(),
                artist: "Artist".to_string(),
                description: "A song".to_string(),
                youtube_link: "https://youtu.be/abc".to_string(),
                tags: vec![],
            }),
            submitter,
        )
    }

    #[tokio::test]
    async fn create_user_rejects_duplicate_username() {
        let store = MemoryCredentialStore::new();
        let user =
            UserDoc::new("alice", "alice@example.com", "hash", Role::Contributor);
        store.create(user).await.unwrap();

        let dup =
            UserDoc::new("alice", "other@example.com", "hash", Role::Contributor);
        let err = store.create(dup).await.unwrap_err();
        assert!(matches!(err, MemoriaError::Conflict(_)));
    }

    #[tokio::test]
    async fn create_user_rejects_duplicate_email() {
        let store = MemoryCredentialStore::new();
        let user =
            UserDoc::new("alice", "alice@example.com", "hash", Role::Contributor);
        store.create(user).await.unwrap();

        let dup =
            UserDoc::new("bob", "alice@example.com", "hash", Role::Contributor);
        let err = store.create(dup).await.unwrap_err();
        assert!(matches!(err, MemoriaError::Conflict(_)));
    }

    #[tokio::test]
    async fn list_all_returns_newest_first() {
        let store = MemoryContentStore::new();
        store.insert(song("first", "u1")).await.unwrap();
        store.insert(song("second", "u1")).await.unwrap();
        store.insert(song("third", "u2")).await.unwrap();

        let all = store.list_all(None).await.unwrap();
        let titles: Vec<&str> = all
            .iter()
            .map(|i| match &i.payload {
                ContentPayload::Song(s) => s.title.as_str(),
                _ => "",
            })
            .collect();
        assert_eq!(titles, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn apply_decision_on_missing_item_returns_none() {
        let store = MemoryContentStore::new();
        let result = store
            .apply_decision(
                "missing",
                Decision {
                    status: ModerationStatus::Approved,
                    reviewed_by: "mod".to_string(),
                    reviewed_at: bson::DateTime::now(),
                    rejection_reason: None,
                },
            )
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_returns_false_when_already_gone() {
        let store = MemoryContentStore::new();
        let item = store.insert(song("x", "u1")).await.unwrap();
        assert!(store.delete(&item.id).await.unwrap());
        assert!(!store.delete(&item.id).await.unwrap());
    }

    #[tokio::test]
    async fn list_by_submitter_filters_by_kind() {
        let store = MemoryContentStore::new();
        store.insert(song("mine", "u1")).await.unwrap();
        store.insert(song("theirs", "u2")).await.unwrap();

        let mine = store
            .list_by_submitter("u1", Some(ContentKind::Song))
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);

        let none = store
            .list_by_submitter("u1", Some(ContentKind::Martyr))
            .await
            .unwrap();
        assert!(none.is_empty());
    }
}
