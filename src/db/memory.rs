// Process-local document store (local deployment mode and tests)

use crate::db::store::{timestamp, Collection, DocumentStore};
use crate::errors::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<(String, Value)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn upsert(documents: &mut Vec<(String, Value)>, id: &str, value: Value) {
    match documents.iter_mut().find(|(existing, _)| existing == id) {
        Some(slot) => slot.1 = value,
        None => documents.push((id.to_string(), value)),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|(existing, _)| existing == id))
            .map(|(_, value)| value.clone()))
    }

    async fn put(&self, collection: Collection, id: &str, value: Value) -> Result<()> {
        let mut collections = self.collections.write().await;
        upsert(collections.entry(collection).or_default(), id, value);
        Ok(())
    }

    async fn put_many(&self, collection: Collection, documents: Vec<(String, Value)>) -> Result<()> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();
        for (id, value) in documents {
            upsert(docs, &id, value);
        }
        Ok(())
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| docs.iter().map(|(_, value)| value.clone()).collect())
            .unwrap_or_default())
    }

    async fn query(&self, collection: Collection, field: &str, value: &str) -> Result<Vec<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| doc.get(field).and_then(Value::as_str) == Some(value))
                    .map(|(_, doc)| doc.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|(existing, _)| existing != id);
        Ok(docs.len() != before)
    }

    async fn delete_expired(&self, collection: Collection, field: &str, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|(_, doc)| timestamp(doc, field).map_or(true, |at| at > cutoff));
        Ok((before - docs.len()) as u64)
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryStore::new();
        store
            .put(Collection::Users, "u1", json!({"id": "u1", "nameKey": "joao"}))
            .await
            .unwrap();

        let doc = store.get(Collection::Users, "u1").await.unwrap();
        assert_eq!(doc.unwrap()["nameKey"], "joao");
        assert!(store.get(Collection::Sessions, "u1").await.unwrap().is_none());

        assert!(store.delete(Collection::Users, "u1").await.unwrap());
        assert!(!store.delete(Collection::Users, "u1").await.unwrap());
        assert!(store.get(Collection::Users, "u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order_across_replacement() {
        let store = MemoryStore::new();
        for id in ["a", "b", "c"] {
            store
                .put(Collection::ActivityReports, id, json!({"id": id, "v": 1}))
                .await
                .unwrap();
        }
        store
            .put(Collection::ActivityReports, "a", json!({"id": "a", "v": 2}))
            .await
            .unwrap();

        let docs = store.list(Collection::ActivityReports).await.unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(docs[0]["v"], 2);
    }

    #[tokio::test]
    async fn test_query_by_field() {
        let store = MemoryStore::new();
        store
            .put_many(
                Collection::ActivityReports,
                vec![
                    ("r1".to_string(), json!({"userId": "u1"})),
                    ("r2".to_string(), json!({"userId": "u2"})),
                    ("r3".to_string(), json!({"userId": "u1"})),
                ],
            )
            .await
            .unwrap();

        let matches = store
            .query(Collection::ActivityReports, "userId", "u1")
            .await
            .unwrap();
        assert_eq!(matches.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_expired() {
        let store = MemoryStore::new();
        let now = Utc::now();
        for (id, at) in [
            ("old", now - chrono::Duration::minutes(5)),
            ("edge", now),
            ("live", now + chrono::Duration::minutes(5)),
        ] {
            store
                .put(Collection::Sessions, id, json!({"id": id, "expiresAt": at.to_rfc3339()}))
                .await
                .unwrap();
        }
        store
            .put(Collection::Sessions, "undated", json!({"id": "undated"}))
            .await
            .unwrap();

        let removed = store
            .delete_expired(Collection::Sessions, "expiresAt", now)
            .await
            .unwrap();

        assert_eq!(removed, 2);
        let left: Vec<_> = store
            .list(Collection::Sessions)
            .await
            .unwrap()
            .into_iter()
            .map(|doc| doc["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(left, vec!["live", "undated"]);
    }
}
