use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

use super::{Collection, DocFilter, DocumentStore, StoreError};

/// A typed document living in one collection
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: Collection;

    fn id(&self) -> Uuid;
}

/// Typed access to one collection of a `DocumentStore`
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _phantom: PhantomData<T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T: Document> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    pub async fn insert(&self, doc: &T) -> Result<(), StoreError> {
        self.store
            .insert(T::COLLECTION, doc.id(), serde_json::to_value(doc)?)
            .await
    }

    pub async fn select_one(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        match self.store.get(T::COLLECTION, id).await? {
            Some(value) => Ok(Some(decode(value)?)),
            None => Ok(None),
        }
    }

    pub async fn select_404(&self, id: Uuid) -> Result<T, StoreError> {
        self.select_one(id).await?.ok_or(StoreError::NotFound {
            collection: T::COLLECTION,
            id,
        })
    }

    pub async fn select_any(&self, filter: &DocFilter) -> Result<Vec<T>, StoreError> {
        self.store
            .list(T::COLLECTION, filter)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    pub async fn select_first(&self, filter: &DocFilter) -> Result<Option<T>, StoreError> {
        Ok(self.select_any(filter).await?.into_iter().next())
    }

    pub async fn count(&self, filter: &DocFilter) -> Result<usize, StoreError> {
        Ok(self.store.list(T::COLLECTION, filter).await?.len())
    }

    pub async fn replace(&self, doc: &T) -> Result<(), StoreError> {
        self.store
            .replace(T::COLLECTION, doc.id(), serde_json::to_value(doc)?)
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.store.delete(T::COLLECTION, id).await
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::InvalidDocument(e.to_string()))
}
