// Session/auth service: login, logout, password change, token restore, registration

use crate::auth::jwt::JwtManager;
use crate::auth::password::{check_secret, hash_secret, validate_new_password};
use crate::config::Config;
use crate::db::{AccountDirectory, CredentialStore, SessionRecord, SessionStore};
use crate::domain::account::normalize_display_name;
use crate::domain::{Account, Rank, Role, Unit, ADMIN_ACCOUNT_ID};
use crate::errors::{AppError, Result};
use crate::observability::MetricsRecorder;
use serde::Serialize;
use std::sync::Arc;

/// The authenticated identity attached to a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub account_id: String,
    pub display_name: String,
    pub role: Role,
    pub session_id: String,
}

impl Principal {
    pub fn is_administrator(&self) -> bool {
        self.role == Role::Administrator
    }
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub principal: Principal,
    pub token: String,
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct AuthService {
    directory: AccountDirectory,
    credentials: CredentialStore,
    sessions: SessionStore,
    jwt: Arc<JwtManager>,
    admin_display_name: String,
    admin_initial_password: String,
    password_min_length: usize,
}

impl AuthService {
    pub fn new(
        config: &Config,
        directory: AccountDirectory,
        credentials: CredentialStore,
        sessions: SessionStore,
    ) -> Result<Self> {
        Ok(Self {
            directory,
            credentials,
            sessions,
            jwt: Arc::new(JwtManager::new(&config.auth)?),
            admin_display_name: normalize_display_name(&config.admin.username),
            admin_initial_password: config.admin.initial_password.clone(),
            password_min_length: config.password_min_length(),
        })
    }

    pub fn password_min_length(&self) -> usize {
        self.password_min_length
    }

    /// Authenticate by display name and secret.
    ///
    /// The reserved administrator name is tried first; any other identifier
    /// is resolved case-insensitively against the directory. Unknown names and
    /// wrong secrets fail the same way.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<LoginOutcome> {
        let result = self.try_login(identifier, secret).await;

        match &result {
            Ok(outcome) => {
                MetricsRecorder::record_login("success", outcome.principal.role.as_str());
                tracing::info!(
                    account_id = %outcome.principal.account_id,
                    role = outcome.principal.role.as_str(),
                    "Successful login"
                );
            }
            Err(AppError::InvalidCredentials) => {
                MetricsRecorder::record_login("invalid_credentials", "unknown");
                tracing::warn!(identifier = %identifier.trim(), "Rejected login attempt");
            }
            Err(e) => {
                MetricsRecorder::record_login("error", "unknown");
                tracing::error!(error = %e, "Login failed");
            }
        }

        result
    }

    async fn try_login(&self, identifier: &str, secret: &str) -> Result<LoginOutcome> {
        let subject = if self.directory.is_reserved_name(identifier) {
            Some((
                ADMIN_ACCOUNT_ID.to_string(),
                self.admin_display_name.clone(),
                Role::Administrator,
            ))
        } else {
            self.directory
                .find_by_name(identifier)
                .await?
                .map(|account| (account.id, account.display_name, Role::Regular))
        };

        let stored = match &subject {
            Some((account_id, _, _)) => self
                .credentials
                .get(account_id)
                .await?
                .map(|credential| credential.secret_hash),
            None => None,
        };

        // Runs the full verification even when there is nothing to match
        let verified = check_secret(secret, stored).await?;

        let Some((account_id, display_name, role)) = subject.filter(|_| verified) else {
            return Err(AppError::InvalidCredentials);
        };

        let claims = self.jwt.new_claims(&account_id, &display_name, role);
        let token = self.jwt.encode(&claims)?;

        self.sessions
            .create(&SessionRecord {
                id: claims.jti.clone(),
                account_id: account_id.clone(),
                role,
                created_at: claims.issued_at(),
                expires_at: claims.expires_at(),
            })
            .await?;

        Ok(LoginOutcome {
            principal: Principal {
                account_id,
                display_name,
                role,
                session_id: claims.jti,
            },
            token,
            expires_in: self.jwt.session_ttl_seconds(),
        })
    }

    /// Resolve a bearer token into a principal while its session record is live
    pub async fn restore(&self, token: &str) -> Result<Principal> {
        let claims = self.jwt.validate(token).map_err(|e| {
            tracing::debug!(error = %e, "Token rejected");
            AppError::NotAuthenticated
        })?;

        let record = self
            .sessions
            .get(claims.session_id())
            .await?
            .ok_or(AppError::NotAuthenticated)?;

        if record.account_id != claims.sub || record.role != claims.role {
            return Err(AppError::NotAuthenticated);
        }

        Ok(Principal {
            account_id: claims.sub,
            display_name: claims.name,
            role: claims.role,
            session_id: claims.jti,
        })
    }

    /// End the presented session. Never fails.
    pub async fn logout(&self, principal: Option<&Principal>) {
        let Some(principal) = principal else {
            return;
        };

        if let Err(e) = self.sessions.revoke(&principal.session_id).await {
            tracing::error!(
                session_id = %principal.session_id,
                error = %e,
                "Failed to revoke session on logout"
            );
        }
    }

    /// Replace the caller's secret and end every session of the account
    pub async fn change_password(
        &self,
        principal: Option<&Principal>,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<()> {
        validate_new_password(new_password, confirm_password, self.password_min_length)?;
        let principal = principal.ok_or(AppError::NotAuthenticated)?;

        self.replace_credential(&principal.account_id, new_password)
            .await?;

        tracing::info!(account_id = %principal.account_id, "Password changed");

        Ok(())
    }

    /// Administrator reset of another account's secret
    pub async fn reset_password(&self, account_id: &str, new_password: &str) -> Result<()> {
        validate_new_password(new_password, new_password, self.password_min_length)?;

        if self.directory.get(account_id).await?.is_none() {
            return Err(AppError::NotFound);
        }

        self.replace_credential(account_id, new_password).await?;

        tracing::info!(account_id = %account_id, "Password reset by administrator");

        Ok(())
    }

    async fn replace_credential(&self, account_id: &str, new_password: &str) -> Result<()> {
        let hash = hash_secret(new_password).await?;
        self.credentials.set(account_id, hash).await?;
        self.sessions.revoke_all_for_account(account_id).await?;
        Ok(())
    }

    /// Create an account together with its credential.
    ///
    /// If the credential cannot be written the new profile is removed again.
    pub async fn register(
        &self,
        display_name: &str,
        secret: &str,
        rank: Rank,
        unit: Unit,
    ) -> Result<Account> {
        validate_new_password(secret, secret, self.password_min_length)?;
        let hash = hash_secret(secret).await?;

        let account = self.directory.create_account(display_name, rank, unit).await?;

        if let Err(e) = self.credentials.set(&account.id, hash).await {
            tracing::error!(
                account_id = %account.id,
                error = %e,
                "Credential write failed, removing new account"
            );
            if let Err(cleanup) = self.directory.delete_account(&account.id).await {
                tracing::error!(
                    account_id = %account.id,
                    error = %cleanup,
                    "Failed to remove account after credential failure"
                );
            }
            return Err(e);
        }

        Ok(account)
    }

    /// Seed the administrator credential when none exists yet
    pub async fn ensure_admin_credential(&self) -> Result<bool> {
        if self.credentials.get(ADMIN_ACCOUNT_ID).await?.is_some() {
            return Ok(false);
        }

        let hash = hash_secret(&self.admin_initial_password).await?;
        self.credentials.set(ADMIN_ACCOUNT_ID, hash).await?;

        tracing::warn!("Administrator credential seeded from configuration");

        Ok(true)
    }
}
