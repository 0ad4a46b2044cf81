use crate::errors::{AppError, Result};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub admin: AdminConfig,
    pub observability: ObservabilityConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local collections, lost on restart
    Memory,
    /// JSONB documents in PostgreSQL
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub session_ttl_seconds: i64,
    /// Falls back to the deployment-mode default when unset
    pub password_min_length: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Reserved login name of the administrator, matched case-insensitively
    pub username: String,
    /// Seeded only when no administrator credential exists yet
    pub initial_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_format: String,
    pub metrics_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub cors_allowed_origins: Vec<String>,
}

/// Minimum secret length for the local (in-memory) deployment mode
pub const LOCAL_PASSWORD_MIN_LENGTH: usize = 4;
/// Minimum secret length when backed by the remote database
pub const REMOTE_PASSWORD_MIN_LENGTH: usize = 6;

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let environment = env::var("SIOPAMB_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(
                config::File::with_name(&format!("config/{}", environment)).required(false),
            )
            // e.g., SIOPAMB__SERVER__PORT=8080
            .add_source(
                config::Environment::with_prefix("SIOPAMB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::Configuration(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::Configuration(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::Configuration("Invalid port number".to_string()));
        }

        if self.storage.backend == StorageBackend::Postgres && self.storage.database.url.is_empty()
        {
            return Err(AppError::Configuration(
                "Database URL is required for the postgres backend".to_string(),
            ));
        }

        if self.auth.jwt_secret.len() < 32 {
            return Err(AppError::Configuration(
                "JWT secret must be at least 32 characters long".to_string(),
            ));
        }

        if self.auth.session_ttl_seconds <= 0 {
            return Err(AppError::Configuration(
                "Session TTL must be positive".to_string(),
            ));
        }

        if self.password_min_length() < LOCAL_PASSWORD_MIN_LENGTH {
            return Err(AppError::Configuration(format!(
                "Password min length must be at least {}",
                LOCAL_PASSWORD_MIN_LENGTH
            )));
        }

        if self.admin.username.trim().is_empty() {
            return Err(AppError::Configuration(
                "Administrator username is required".to_string(),
            ));
        }

        Ok(())
    }

    /// Effective minimum secret length for new passwords
    pub fn password_min_length(&self) -> usize {
        self.auth.password_min_length.unwrap_or(match self.storage.backend {
            StorageBackend::Memory => LOCAL_PASSWORD_MIN_LENGTH,
            StorageBackend::Postgres => REMOTE_PASSWORD_MIN_LENGTH,
        })
    }
}

impl Default for Config {
    /// In-memory development configuration
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            storage: StorageConfig {
                backend: StorageBackend::Memory,
                database: DatabaseConfig {
                    url: String::new(),
                    max_connections: 10,
                    min_connections: 1,
                    acquire_timeout_seconds: 5,
                    idle_timeout_seconds: 600,
                },
            },
            auth: AuthConfig {
                jwt_secret: "development-only-secret-change-me-please-0001".to_string(),
                jwt_issuer: "siopamb".to_string(),
                jwt_audience: "siopamb-portal".to_string(),
                session_ttl_seconds: 8 * 60 * 60,
                password_min_length: None,
            },
            admin: AdminConfig {
                username: "adm".to_string(),
                initial_password: "adm".to_string(),
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                log_format: "pretty".to_string(),
                metrics_enabled: true,
            },
            security: SecurityConfig {
                cors_allowed_origins: vec!["*".to_string()],
            },
        }
    }
}
