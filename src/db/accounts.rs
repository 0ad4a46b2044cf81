// Account directory: profiles keyed by id, display names unique case-insensitively

use crate::db::credentials::CredentialStore;
use crate::db::reports::ReportLedger;
use crate::db::sessions::SessionStore;
use crate::db::store::{Collection, DocumentStore};
use crate::domain::account::{is_valid_person_name, name_key, normalize_display_name};
use crate::domain::{Account, FieldError, Rank, Unit};
use crate::errors::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Stored shape: the profile plus its lookup key
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountDocument {
    #[serde(flatten)]
    account: Account,
    name_key: String,
}

impl AccountDocument {
    fn new(account: Account) -> Self {
        let name_key = name_key(&account.display_name);
        Self { account, name_key }
    }
}

/// What a cascading delete removed
#[derive(Debug, Clone, Serialize)]
pub struct DeletionSummary {
    pub account_id: String,
    pub reports_removed: usize,
    pub sessions_revoked: u64,
}

#[derive(Clone)]
pub struct AccountDirectory {
    store: Arc<dyn DocumentStore>,
    credentials: CredentialStore,
    ledger: ReportLedger,
    sessions: SessionStore,
    reserved_name_key: String,
    // Serializes the uniqueness check and the write
    create_lock: Arc<Mutex<()>>,
}

impl AccountDirectory {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        credentials: CredentialStore,
        ledger: ReportLedger,
        sessions: SessionStore,
        reserved_name: &str,
    ) -> Self {
        Self {
            store,
            credentials,
            ledger,
            sessions,
            reserved_name_key: name_key(reserved_name),
            create_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Whether `name` is the administrator's reserved login name
    pub fn is_reserved_name(&self, name: &str) -> bool {
        name_key(name) == self.reserved_name_key
    }

    pub async fn create_account(&self, display_name: &str, rank: Rank, unit: Unit) -> Result<Account> {
        if !is_valid_person_name(display_name) {
            return Err(AppError::Validation(vec![FieldError::new(
                "displayName",
                "Use apenas letras, espaços, hífen ou apóstrofo.",
            )]));
        }

        let display_name = normalize_display_name(display_name);
        if self.is_reserved_name(&display_name) {
            return Err(AppError::DuplicateName);
        }

        let _guard = self.create_lock.lock().await;

        if self.find_by_name(&display_name).await?.is_some() {
            tracing::warn!(display_name = %display_name, "Display name already in use");
            return Err(AppError::DuplicateName);
        }

        let account = Account {
            id: Uuid::new_v4().to_string(),
            display_name,
            rank,
            unit,
        };

        self.store
            .put(
                Collection::Users,
                &account.id,
                serde_json::to_value(AccountDocument::new(account.clone()))?,
            )
            .await?;

        tracing::info!(
            account_id = %account.id,
            display_name = %account.display_name,
            "Created account"
        );

        Ok(account)
    }

    /// Change rank and/or unit. The display name never changes.
    pub async fn update_account(
        &self,
        id: &str,
        rank: Option<Rank>,
        unit: Option<Unit>,
    ) -> Result<Account> {
        let mut account = self.get(id).await?.ok_or(AppError::NotFound)?;

        if let Some(rank) = rank {
            account.rank = rank;
        }
        if let Some(unit) = unit {
            account.unit = unit;
        }

        self.store
            .put(
                Collection::Users,
                id,
                serde_json::to_value(AccountDocument::new(account.clone()))?,
            )
            .await?;

        tracing::info!(account_id = %id, "Updated account");

        Ok(account)
    }

    /// Remove an account with its sessions, credential and reports
    pub async fn delete_account(&self, id: &str) -> Result<DeletionSummary> {
        if self.get(id).await?.is_none() {
            return Err(AppError::NotFound);
        }

        let sessions_revoked = self.sessions.revoke_all_for_account(id).await?;
        let reports_removed = self.ledger.remove_by_account(id).await?;
        self.credentials.remove(id).await?;
        self.store.delete(Collection::Users, id).await?;

        tracing::info!(
            account_id = %id,
            reports_removed,
            sessions_revoked,
            "Deleted account"
        );

        Ok(DeletionSummary {
            account_id: id.to_string(),
            reports_removed,
            sessions_revoked,
        })
    }

    /// Accounts in insertion order
    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.store
            .list(Collection::Users)
            .await?
            .into_iter()
            .map(|doc| Ok(serde_json::from_value::<AccountDocument>(doc)?.account))
            .collect()
    }

    pub async fn get(&self, id: &str) -> Result<Option<Account>> {
        match self.store.get(Collection::Users, id).await? {
            Some(doc) => Ok(Some(serde_json::from_value::<AccountDocument>(doc)?.account)),
            None => Ok(None),
        }
    }

    /// Case-insensitive lookup by display name
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Account>> {
        let docs = self
            .store
            .query(Collection::Users, "nameKey", &name_key(name))
            .await?;

        match docs.into_iter().next() {
            Some(doc) => Ok(Some(serde_json::from_value::<AccountDocument>(doc)?.account)),
            None => Ok(None),
        }
    }
}
