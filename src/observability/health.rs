use crate::config::StorageBackend;
use crate::db::DocumentStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub checks: HealthChecks,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthChecks {
    pub storage: ComponentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub status: String,
    pub backend: Option<String>,
    pub message: Option<String>,
}

pub struct HealthChecker {
    store: Arc<dyn DocumentStore>,
    backend: StorageBackend,
}

impl HealthChecker {
    pub fn new(store: Arc<dyn DocumentStore>, backend: StorageBackend) -> Self {
        Self { store, backend }
    }

    /// Liveness check - is the service running?
    pub async fn liveness(&self) -> HealthStatus {
        HealthStatus {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            checks: HealthChecks {
                storage: ComponentStatus {
                    status: "unknown".to_string(),
                    backend: Some(self.backend_name().to_string()),
                    message: None,
                },
            },
        }
    }

    /// Readiness check - can the service handle requests?
    pub async fn readiness(&self) -> HealthStatus {
        let storage = self.check_storage().await;

        let overall_status = if storage.status == "ok" { "ok" } else { "degraded" };

        HealthStatus {
            status: overall_status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            checks: HealthChecks { storage },
        }
    }

    async fn check_storage(&self) -> ComponentStatus {
        match self.store.health_check().await {
            Ok(()) => ComponentStatus {
                status: "ok".to_string(),
                backend: Some(self.backend_name().to_string()),
                message: None,
            },
            Err(e) => ComponentStatus {
                status: "error".to_string(),
                backend: Some(self.backend_name().to_string()),
                message: Some(format!("Storage check failed: {}", e)),
            },
        }
    }

    fn backend_name(&self) -> &'static str {
        match self.backend {
            StorageBackend::Memory => "memory",
            StorageBackend::Postgres => "postgres",
        }
    }
}
