// Document store abstraction shared by the in-memory and PostgreSQL backends

use crate::errors::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;

/// Top-level collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    UserPasswords,
    ActivityReports,
    Sessions,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::UserPasswords => "userPasswords",
            Collection::ActivityReports => "activityReports",
            Collection::Sessions => "sessions",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key-value/document storage. Every collection keeps insertion order;
/// `put` on an existing id replaces the document without moving it.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>>;

    async fn put(&self, collection: Collection, id: &str, value: Value) -> Result<()>;

    /// Write several documents; backends may do it atomically
    async fn put_many(&self, collection: Collection, documents: Vec<(String, Value)>) -> Result<()> {
        for (id, value) in documents {
            self.put(collection, &id, value).await?;
        }
        Ok(())
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Value>>;

    /// Documents whose top-level string `field` equals `value`
    async fn query(&self, collection: Collection, field: &str, value: &str) -> Result<Vec<Value>>;

    /// Returns whether a document was removed
    async fn delete(&self, collection: Collection, id: &str) -> Result<bool>;

    /// Remove documents whose RFC 3339 timestamp `field` is at or before
    /// `cutoff`; returns how many went
    async fn delete_expired(&self, collection: Collection, field: &str, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut removed = 0;
        for doc in self.list(collection).await? {
            let (Some(id), Some(at)) = (doc.get("id").and_then(Value::as_str), timestamp(&doc, field)) else {
                continue;
            };
            if at <= cutoff && self.delete(collection, id).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn health_check(&self) -> Result<()>;
}

/// Top-level RFC 3339 timestamp of a document
pub(crate) fn timestamp(doc: &Value, field: &str) -> Option<DateTime<Utc>> {
    doc.get(field)
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|at| at.with_timezone(&Utc))
}
