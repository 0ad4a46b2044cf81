// Credential store: account id → password hash, kept apart from profiles

use crate::db::store::{Collection, DocumentStore};
use crate::errors::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub account_id: String,
    /// Argon2id PHC string
    pub secret_hash: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn DocumentStore>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create or wholesale replace the credential of an account
    pub async fn set(&self, account_id: &str, secret_hash: String) -> Result<()> {
        let credential = Credential {
            account_id: account_id.to_string(),
            secret_hash,
            updated_at: Utc::now(),
        };

        self.store
            .put(
                Collection::UserPasswords,
                account_id,
                serde_json::to_value(&credential)?,
            )
            .await?;

        tracing::debug!(account_id = %account_id, "Stored credential");

        Ok(())
    }

    pub async fn get(&self, account_id: &str) -> Result<Option<Credential>> {
        match self.store.get(Collection::UserPasswords, account_id).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn remove(&self, account_id: &str) -> Result<bool> {
        self.store.delete(Collection::UserPasswords, account_id).await
    }
}
