//! Secret hashing and verification.
//!
//! Client secrets and user passwords share one scheme: Argon2id with a random
//! salt, stored as a PHC string. Verification compares in constant time.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use once_cell::sync::Lazy;

/// Hash checked when a lookup finds nothing, so a miss costs as much as a hit.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_secret("muista-dummy-client-secret").ok());

/// Hash a secret using Argon2id.
///
/// Returns the PHC-formatted hash string suitable for storage.
pub fn hash_secret(secret: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(secret.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a secret against a stored hash. Malformed hashes never verify.
pub fn verify_secret(secret: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Burn one verification's worth of work. Always returns false.
pub fn verify_against_dummy(secret: &str) -> bool {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_secret(secret, hash);
    }
    false
}

#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("hashing failed: {0}")]
    Hash(String),
    #[error("hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Run [`hash_secret`] off the async executor.
pub async fn hash_secret_blocking(secret: String) -> Result<String, HashError> {
    tokio::task::spawn_blocking(move || hash_secret(&secret))
        .await?
        .map_err(|e| HashError::Hash(e.to_string()))
}

/// Run [`verify_secret`] off the async executor. `None` as the hash runs the
/// dummy verification instead.
pub async fn verify_secret_blocking(secret: String, hash: Option<String>) -> bool {
    tokio::task::spawn_blocking(move || match hash {
        Some(hash) => verify_secret(&secret, &hash),
        None => verify_against_dummy(&secret),
    })
    .await
    .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_secret() {
        let secret = "V1StGXR8_Z5jdHi6B-myT";
        let hash = hash_secret(secret).expect("Failed to hash secret");

        assert!(hash.starts_with("$argon2id"));
        assert!(verify_secret(secret, &hash));
        assert!(!verify_secret("V1StGXR8_Z5jdHi6B-myU", &hash));
    }

    #[test]
    fn test_hash_produces_different_salts() {
        let hash1 = hash_secret("same-secret").expect("Failed to hash");
        let hash2 = hash_secret("same-secret").expect("Failed to hash");

        assert_ne!(hash1, hash2);
        assert!(verify_secret("same-secret", &hash1));
        assert!(verify_secret("same-secret", &hash2));
    }

    #[test]
    fn test_verify_invalid_hash_format() {
        assert!(!verify_secret("secret", "not-a-valid-hash"));
        assert!(!verify_secret("secret", ""));
        assert!(!verify_secret("secret", "$invalid$hash$format"));
    }

    #[test]
    fn test_dummy_verification_never_succeeds() {
        assert!(!verify_against_dummy("muista-dummy-client-secret"));
        assert!(!verify_against_dummy(""));
    }

    #[tokio::test]
    async fn test_blocking_wrappers() {
        let hash = hash_secret_blocking("pw-123456".into())
            .await
            .expect("hash");
        assert!(verify_secret_blocking("pw-123456".into(), Some(hash.clone())).await);
        assert!(!verify_secret_blocking("nope".into(), Some(hash)).await);
        assert!(!verify_secret_blocking("pw-123456".into(), None).await);
    }
}
