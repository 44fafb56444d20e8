//! MongoDB client and collection wrapper
//!
//! Typed collections with schema-declared indexes. Content removal is a
//! hard delete, so there is no soft-delete filtering here.

use bson::{doc, DateTime, Document};
use mongodb::{
    options::{IndexOptions, ReturnDocument, UpdateModifications},
    results::{DeleteResult, UpdateResult},
    Client, Collection, IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, info};

use crate::db::schemas::Metadata;
use crate::types::MemoriaError;

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// Trait for schemas with mutable metadata
pub trait MutMetadata {
    fn mut_metadata(&mut self) -> &mut Metadata;
}

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Create a new MongoDB client
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, MemoriaError> {
        info!("Connecting to MongoDB at {}", uri);

        // Use serverSelectionTimeoutMS to avoid hanging on unreachable MongoDB
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| MemoriaError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        // Verify connection with timeout
        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| MemoriaError::Database(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    /// Get a typed collection
    pub async fn collection<T>(&self, name: &str) -> Result<MongoCollection<T>, MemoriaError>
    where
        T: Serialize + DeserializeOwned + Unpin + Send + Sync + IntoIndexes + MutMetadata,
    {
        MongoCollection::new(&self.client, &self.db_name, name).await
    }

    /// Get the raw MongoDB client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Get the database name
    pub fn db_name(&self) -> &str {
        &self.db_name
    }
}

/// Typed MongoDB collection with automatic indexing
#[derive(Debug, Clone)]
pub struct MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    inner: Collection<T>,
}

impl<T> MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync + IntoIndexes + MutMetadata,
{
    /// Create a new collection and apply indexes
    pub async fn new(
        client: &Client,
        db_name: &str,
        collection_name: &str,
    ) -> Result<Self, MemoriaError> {
        let collection = client.database(db_name).collection::<T>(collection_name);
        let mongo_collection = MongoCollection { inner: collection };

        mongo_collection.apply_indexes().await?;

        Ok(mongo_collection)
    }

    /// Apply schema-defined indexes
    async fn apply_indexes(&self) -> Result<(), MemoriaError> {
        let schema_indices = T::into_indices();

        if schema_indices.is_empty() {
            return Ok(());
        }

        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        self.inner
            .create_indexes(indices)
            .await
            .map_err(|e| MemoriaError::Database(format!("Failed to create indexes: {}", e)))?;

        Ok(())
    }

    /// Insert a document, setting metadata timestamps
    pub async fn insert_one(&self, mut item: T) -> Result<(), MemoriaError> {
        let metadata = item.mut_metadata();
        metadata.created_at = Some(DateTime::now());
        metadata.updated_at = Some(DateTime::now());

        self.inner
            .insert_one(item)
            .await
            .map_err(|e| MemoriaError::Database(format!("Insert failed: {}", e)))?;

        Ok(())
    }

    /// Find one document by filter
    pub async fn find_one(&self, filter: Document) -> Result<Option<T>, MemoriaError> {
        self.inner
            .find_one(filter)
            .await
            .map_err(|e| MemoriaError::Database(format!("Find failed: {}", e)))
    }

    /// Find many documents by filter, with an optional sort order
    pub async fn find_many(
        &self,
        filter: Document,
        sort: Option<Document>,
    ) -> Result<Vec<T>, MemoriaError> {
        use futures_util::StreamExt;

        let mut find = self.inner.find(filter);
        if let Some(sort) = sort {
            find = find.sort(sort);
        }

        let cursor = find
            .await
            .map_err(|e| MemoriaError::Database(format!("Find failed: {}", e)))?;

        let results: Vec<T> = cursor
            .filter_map(|doc| async {
                match doc {
                    Ok(d) => Some(d),
                    Err(e) => {
                        error!("Error reading document: {}", e);
                        None
                    }
                }
            })
            .collect()
            .await;

        Ok(results)
    }

    /// Update one document
    pub async fn update_one(
        &self,
        filter: Document,
        update: impl Into<UpdateModifications>,
    ) -> Result<UpdateResult, MemoriaError> {
        self.inner
            .update_one(filter, update.into())
            .await
            .map_err(|e| MemoriaError::Database(format!("Update failed: {}", e)))
    }

    /// Atomically update one document and return the updated version
    pub async fn find_one_and_update(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<Option<T>, MemoriaError> {
        self.inner
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| MemoriaError::Database(format!("Update failed: {}", e)))
    }

    /// Hard-delete one document
    pub async fn delete_one(&self, filter: Document) -> Result<DeleteResult, MemoriaError> {
        self.inner
            .delete_one(filter)
            .await
            .map_err(|e| MemoriaError::Database(format!("Delete failed: {}", e)))
    }

    /// Get the underlying collection for advanced operations
    pub fn inner(&self) -> &Collection<T> {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    // Integration tests require a running MongoDB instance; the workflow
    // and store behavior is covered against the in-memory backend in
    // store::memory and moderation::workflow.
}
