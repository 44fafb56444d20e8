//! Password hashing and verification using Argon2
//!
//! Uses the argon2id variant with default parameters. Plaintext secrets
//! exist only transiently inside this module; everything else in the
//! service sees PHC-formatted hashes.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::types::MemoriaError;

/// Hash a secret using Argon2id.
///
/// Returns the PHC-formatted hash string that includes the salt and parameters.
pub fn hash_secret(secret: &str) -> Result<String, MemoriaError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| MemoriaError::Auth(format!("Failed to hash secret: {e}")))
}

/// Verify a secret against a stored hash.
///
/// Returns true if the secret matches the hash.
pub fn verify_secret(secret: &str, hash: &str) -> Result<bool, MemoriaError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| MemoriaError::Auth(format!("Invalid secret hash format: {e}")))?;

    Ok(Argon2::default()
        .verify_password(secret.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let secret = "correct-horse-battery-staple";
        let hash = hash_secret(secret).unwrap();

        // Hash should be in PHC format
        assert!(hash.starts_with("$argon2"));

        assert!(verify_secret(secret, &hash).unwrap());
        assert!(!verify_secret("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_different_salts() {
        let secret = "same-password";
        let hash1 = hash_secret(secret).unwrap();
        let hash2 = hash_secret(secret).unwrap();

        // Same secret should produce different hashes (different salts)
        assert_ne!(hash1, hash2);

        assert!(verify_secret(secret, &hash1).unwrap());
        assert!(verify_secret(secret, &hash2).unwrap());
    }

    #[test]
    fn test_invalid_hash_format() {
        let result = verify_secret("password", "not-a-valid-hash");
        assert!(result.is_err());
    }
}
