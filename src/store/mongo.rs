//! MongoDB-backed store implementations

use async_trait::async_trait;
use bson::doc;

use crate::db::mongo::{MongoClient, MongoCollection};
use crate::db::schemas::{
    ContentDoc, ContentKind, ModerationStatus, UserDoc, CONTENT_COLLECTION, USER_COLLECTION,
};
use crate::store::{ContentStore, CredentialStore, Decision};
use crate::types::{MemoriaError, Result};

fn newest_first_sort() -> bson::Document {
    doc! { "metadata.created_at": -1 }
}

/// User accounts in MongoDB
pub struct MongoCredentialStore {
    users: MongoCollection<UserDoc>,
}

impl MongoCredentialStore {
    pub async fn new(client: &MongoClient) -> Result<Self> {
        let users = client.collection::<UserDoc>(USER_COLLECTION).await?;
        Ok(Self { users })
    }
}

#[async_trait]
impl CredentialStore for MongoCredentialStore {
    async fn create(&self, user: UserDoc) -> Result<UserDoc> {
        // Pre-check gives a precise message; the unique indexes on
        // username and email still back it up under races.
        let existing = self
            .users
            .find_one(doc! {
                "$or": [
                    { "username": &user.username },
                    { "email": &user.email },
                ]
            })
            .await?;

        if let Some(existing) = existing {
            if existing.username == user.username {
                return Err(MemoriaError::Conflict("Username already taken".to_string()));
            }
            return Err(MemoriaError::Conflict("Email already registered".to_string()));
        }

        match self.users.insert_one(user.clone()).await {
            Ok(()) => Ok(user),
            Err(MemoriaError::Database(msg)) if msg.contains("E11000") => {
                Err(MemoriaError::Conflict("Account already exists".to_string()))
            }
            Err(e) => Err(e),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserDoc>> {
        self.users.find_one(doc! { "email": email }).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserDoc>> {
        self.users.find_one(doc! { "id": id }).await
    }
}

/// Content items in MongoDB
pub struct MongoContentStore {
    items: MongoCollection<ContentDoc>,
}

impl MongoContentStore {
    pub async fn new(client: &MongoClient) -> Result<Self> {
        let items = client.collection::<ContentDoc>(CONTENT_COLLECTION).await?;
        Ok(Self { items })
    }
}

#[async_trait]
impl ContentStore for MongoContentStore {
    async fn insert(&self, item: ContentDoc) -> Result<ContentDoc> {
        self.items.insert_one(item.clone()).await?;
        // insert_one stamps timestamps on its own copy; refetch so the
        // caller sees the stored metadata.
        match self.items.find_one(doc! { "id": &item.id }).await? {
            Some(stored) => Ok(stored),
            None => Ok(item),
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ContentDoc>> {
        self.items.find_one(doc! { "id": id }).await
    }

    async fn apply_decision(&self, id: &str, decision: Decision) -> Result<Option<ContentDoc>> {
        let mut set = doc! {
            "status": decision.status.as_str(),
            "reviewed_by": &decision.reviewed_by,
            "reviewed_at": decision.reviewed_at,
            "metadata.updated_at": bson::DateTime::now(),
        };

        let update = if let Some(reason) = &decision.rejection_reason {
            set.insert("rejection_reason", reason);
            doc! { "$set": set }
        } else {
            doc! { "$set": set, "$unset": { "rejection_reason": "" } }
        };

        self.items.find_one_and_update(doc! { "id": id }, update).await
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = self.items.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_by_status(
        &self,
        kind: ContentKind,
        status: ModerationStatus,
    ) -> Result<Vec<ContentDoc>> {
        self.items
            .find_many(
                doc! { "kind": kind.as_str(), "status": status.as_str() },
                Some(newest_first_sort()),
            )
            .await
    }

    async fn list_by_submitter(
        &self,
        submitter: &str,
        kind: Option<ContentKind>,
    ) -> Result<Vec<ContentDoc>> {
        let mut filter = doc! { "submitted_by": submitter };
        if let Some(kind) = kind {
            filter.insert("kind", kind.as_str());
        }
        self.items.find_many(filter, Some(newest_first_sort())).await
    }

    async fn list_all(&self, kind: Option<ContentKind>) -> Result<Vec<ContentDoc>> {
        let filter = match kind {
            Some(kind) => doc! { "kind": kind.as_str() },
            None => doc! {},
        };
        self.items.find_many(filter, Some(newest_first_sort())).await
    }
}
