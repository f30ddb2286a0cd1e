use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Collection, DocFilter, DocumentStore, StoreError};

/// In-process document store used for development runs and tests
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<(Uuid, Value)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, collection: Collection, id: Uuid, doc: Value) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();
        if docs.iter().any(|(existing, _)| *existing == id) {
            return Err(StoreError::Duplicate { collection, id });
        }
        docs.push((id, doc));
        Ok(())
    }

    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|(existing, _)| *existing == id))
            .map(|(_, doc)| doc.clone()))
    }

    async fn replace(&self, collection: Collection, id: Uuid, doc: Value) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let slot = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|(existing, _)| *existing == id))
            .ok_or(StoreError::NotFound { collection, id })?;
        slot.1 = doc;
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|(existing, _)| *existing != id);
        Ok(docs.len() != before)
    }

    async fn list(&self, collection: Collection, filter: &DocFilter) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(&collection) else {
            return Ok(vec![]);
        };
        let matched = docs
            .iter()
            .filter(|(_, doc)| filter.matches(doc))
            .skip(filter.offset.unwrap_or(0))
            .take(filter.limit.unwrap_or(usize::MAX))
            .map(|(_, doc)| doc.clone())
            .collect();
        Ok(matched)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn insert_get_replace_delete() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        store.insert(Collection::Stock, id, json!({ "in_stock": 2 })).await.unwrap();

        let dup = store.insert(Collection::Stock, id, json!({})).await;
        assert!(matches!(dup, Err(StoreError::Duplicate { .. })));

        store.replace(Collection::Stock, id, json!({ "in_stock": 5 })).await.unwrap();
        let doc = store.get(Collection::Stock, id).await.unwrap().unwrap();
        assert_eq!(doc["in_stock"], 5);

        assert!(store.delete(Collection::Stock, id).await.unwrap());
        assert!(!store.delete(Collection::Stock, id).await.unwrap());
        assert!(store.get(Collection::Stock, id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn replace_missing_is_not_found() {
        let store = MemoryStore::new();
        let res = store.replace(Collection::Users, Uuid::new_v4(), json!({})).await;
        assert!(matches!(res, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn list_filters_and_pages_in_insertion_order() {
        let store = MemoryStore::new();
        for n in 0..5 {
            let status = if n % 2 == 0 { "pending" } else { "approved" };
            store
                .insert(Collection::Purchases, Uuid::new_v4(), json!({ "n": n, "status": status }))
                .await
                .unwrap();
        }

        let pending = DocFilter::new().eq("status", "pending");
        let docs = store.list(Collection::Purchases, &pending).await.unwrap();
        let ns: Vec<i64> = docs.iter().map(|d| d["n"].as_i64().unwrap()).collect();
        assert_eq!(ns, vec![0, 2, 4]);

        let page = pending.paged(Some(1), Some(1));
        let docs = store.list(Collection::Purchases, &page).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["n"], 2);
    }
}
