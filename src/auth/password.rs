// Account secrets: Argon2id PHC strings and the new-password policy

use crate::errors::{AppError, Result};
use once_cell::sync::Lazy;
use argon2::{
    password_hash::{rand_core::OsRng, Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

// 19 MiB, 2 passes, 1 lane, 32-byte digest
const MEMORY_KIB: u32 = 19_456;
const PASSES: u32 = 2;
const LANES: u32 = 1;
const DIGEST_LEN: usize = 32;

fn hasher() -> Result<Argon2<'static>> {
    let params = Params::new(MEMORY_KIB, PASSES, LANES, Some(DIGEST_LEN))
        .map_err(|e| AppError::Cryptographic(format!("Invalid Argon2 parameters: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

// Verified in place of a missing credential
static UNKNOWN_ACCOUNT_CREDENTIAL: Lazy<Option<String>> =
    Lazy::new(|| hash_password("siopamb:unknown-account").ok());

async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("Credential task failed: {}", e)))?
}

/// Check a new secret and its confirmation. Mismatch is reported before length.
pub fn validate_new_password(new_password: &str, confirm_password: &str, min_length: usize) -> Result<()> {
    if new_password != confirm_password {
        return Err(AppError::PasswordMismatch);
    }
    if new_password.chars().count() < min_length {
        return Err(AppError::PasswordTooShort { min: min_length });
    }
    Ok(())
}

/// Produce the stored credential for a secret
pub fn hash_password(secret: &str) -> Result<String> {
    if secret.is_empty() {
        return Err(AppError::PasswordTooShort { min: 1 });
    }

    let salt = SaltString::generate(&mut OsRng);
    let phc = hasher()?
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| AppError::Cryptographic(format!("Failed to hash secret: {}", e)))?;

    Ok(phc.to_string())
}

/// `Ok(false)` on a wrong secret; `Err` only when the stored credential is unreadable
pub fn verify_password(secret: &str, stored: &str) -> Result<bool> {
    let phc = PasswordHash::new(stored)
        .map_err(|e| AppError::Cryptographic(format!("Unreadable stored credential: {}", e)))?;

    match hasher()?.verify_password(secret.as_bytes(), &phc) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(e) => {
            tracing::error!(error = %e, "Credential verification failed");
            Err(AppError::Cryptographic(format!("Credential verification failed: {}", e)))
        }
    }
}

/// `hash_password` on the blocking pool
pub async fn hash_secret(secret: &str) -> Result<String> {
    let secret = secret.to_owned();
    run_blocking(move || hash_password(&secret)).await
}

/// Verify `secret` against the stored credential, if there is one.
///
/// A missing credential is still checked against a throwaway hash and
/// always yields `Ok(false)`.
pub async fn check_secret(secret: &str, stored: Option<String>) -> Result<bool> {
    let secret = secret.to_owned();
    run_blocking(move || match stored {
        Some(stored) => verify_password(&secret, &stored),
        None => {
            if let Some(decoy) = UNKNOWN_ACCOUNT_CREDENTIAL.as_deref() {
                let _ = verify_password(&secret, decoy);
            }
            Ok(false)
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_stored_credential_is_salted_argon2id() {
        let first = hash_password("1234").unwrap();
        let second = hash_password("1234").unwrap();

        assert!(first.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_accepts_only_the_same_secret() {
        let stored = hash_password("senha123").unwrap();

        assert!(verify_password("senha123", &stored).unwrap());
        assert!(!verify_password("Senha123", &stored).unwrap());
        assert!(!verify_password("", &stored).unwrap());
    }

    #[test]
    fn test_unreadable_credential() {
        assert!(matches!(
            verify_password("senha123", "plaintext"),
            Err(AppError::Cryptographic(_))
        ));
    }

    #[test]
    fn test_empty_secret_not_hashed() {
        assert!(hash_password("").is_err());
    }

    #[test]
    fn test_new_password_policy() {
        assert!(validate_new_password("abcd", "abcd", 4).is_ok());
        assert!(matches!(
            validate_new_password("abcd", "abce", 4),
            Err(AppError::PasswordMismatch)
        ));
        assert!(matches!(
            validate_new_password("abc", "abc", 4),
            Err(AppError::PasswordTooShort { min: 4 })
        ));
        assert!(matches!(
            validate_new_password("a", "b", 4),
            Err(AppError::PasswordMismatch)
        ));
        // Length counts characters, not bytes
        assert!(validate_new_password("ção1", "ção1", 4).is_ok());
    }

    #[test]
    fn test_unknown_account_credential_has_full_cost() {
        let decoy = UNKNOWN_ACCOUNT_CREDENTIAL.as_deref().unwrap();
        assert!(decoy.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
    }

    #[tokio::test]
    async fn test_check_secret() {
        let stored = hash_secret("1234").await.unwrap();

        assert!(check_secret("1234", Some(stored.clone())).await.unwrap());
        assert!(!check_secret("4321", Some(stored)).await.unwrap());
        assert!(!check_secret("1234", None).await.unwrap());
        assert!(!check_secret("siopamb:unknown-account", None).await.unwrap());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_hashing_leaves_the_runtime_free() {
        let ticker = tokio::spawn(async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            Instant::now()
        });

        let stored = hash_secret("1234").await.unwrap();
        let hashed_at = Instant::now();
        let ticked_at = ticker.await.unwrap();

        // The timer fired while the hash was still being computed
        assert!(ticked_at < hashed_at);
        assert!(verify_password("1234", &stored).unwrap());
    }
}
