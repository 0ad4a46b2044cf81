pub mod accounts;
pub mod credentials;
pub mod memory;
pub mod postgres;
pub mod reports;
pub mod sessions;
pub mod store;

pub use accounts::{AccountDirectory, DeletionSummary};
pub use credentials::CredentialStore;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use reports::ReportLedger;
pub use sessions::{SessionRecord, SessionStore};
pub use store::{Collection, DocumentStore};

use crate::config::{StorageBackend, StorageConfig};
use crate::errors::Result;
use std::sync::Arc;

/// Build the configured storage backend
pub async fn create_store(config: &StorageConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Postgres => Ok(Arc::new(PgStore::connect(&config.database).await?)),
    }
}
