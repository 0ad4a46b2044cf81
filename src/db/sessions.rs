// Session records backing issued tokens, so they can be revoked server side

use crate::db::store::{Collection, DocumentStore};
use crate::domain::Role;
use crate::errors::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Token id (`jti`)
    pub id: String,
    pub account_id: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn DocumentStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create a new session, clearing out records that have run out
    pub async fn create(&self, record: &SessionRecord) -> Result<()> {
        self.purge_expired().await?;

        self.store
            .put(Collection::Sessions, &record.id, serde_json::to_value(record)?)
            .await?;

        tracing::info!(
            session_id = %record.id,
            account_id = %record.account_id,
            role = record.role.as_str(),
            "Created session"
        );

        Ok(())
    }

    /// Drop every expired record
    pub async fn purge_expired(&self) -> Result<u64> {
        let purged = self
            .store
            .delete_expired(Collection::Sessions, "expiresAt", Utc::now())
            .await?;

        if purged > 0 {
            tracing::debug!(purged, "Purged expired sessions");
        }

        Ok(purged)
    }

    /// Get a live session by token id; expired records are dropped on sight
    pub async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        let Some(doc) = self.store.get(Collection::Sessions, session_id).await? else {
            return Ok(None);
        };

        let record: SessionRecord = serde_json::from_value(doc)?;
        if record.is_expired() {
            self.store.delete(Collection::Sessions, session_id).await?;
            return Ok(None);
        }

        Ok(Some(record))
    }

    /// Revoke a session by token id
    pub async fn revoke(&self, session_id: &str) -> Result<bool> {
        let removed = self.store.delete(Collection::Sessions, session_id).await?;

        if removed {
            tracing::info!(session_id = %session_id, "Revoked session");
        }

        Ok(removed)
    }

    /// Revoke all sessions for an account
    pub async fn revoke_all_for_account(&self, account_id: &str) -> Result<u64> {
        let docs = self
            .store
            .query(Collection::Sessions, "accountId", account_id)
            .await?;

        let mut revoked = 0;
        for doc in docs {
            let record: SessionRecord = serde_json::from_value(doc)?;
            if self.store.delete(Collection::Sessions, &record.id).await? {
                revoked += 1;
            }
        }

        tracing::info!(
            account_id = %account_id,
            revoked,
            "Revoked sessions for account"
        );

        Ok(revoked)
    }
}
