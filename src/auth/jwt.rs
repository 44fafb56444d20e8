//! Bearer token issuing and verification
//!
//! Tokens are stateless HS256 JWTs carrying the principal id and role.
//! Validity is determined entirely by signature and expiry at verification
//! time; there is no revocation list, so a token stays good for its full
//! lifetime regardless of later principal changes.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::db::schemas::Role;
use crate::types::{MemoriaError, Result};

/// Claims carried by every memoria bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Principal id
    pub sub: String,
    /// Principal role at issuance
    pub role: Role,
    /// Issued-at (unix seconds)
    pub iat: u64,
    /// Expiry (unix seconds)
    pub exp: u64,
}

/// Issues and verifies signed, time-limited bearer tokens.
///
/// The signing key is injected from configuration at process start; there
/// is no built-in default.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_seconds: u64,
}

impl TokenService {
    pub fn new(secret: &str, ttl_seconds: u64) -> Result<Self> {
        if secret.trim().is_empty() {
            return Err(MemoriaError::Config(
                "token signing secret must not be empty".into(),
            ));
        }
        if ttl_seconds == 0 {
            return Err(MemoriaError::Config(
                "token ttl must be positive".into(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds,
        })
    }

    /// Issue a token for a principal with a fixed lifetime.
    pub fn issue(&self, principal_id: &str, role: Role) -> Result<String> {
        let now = unix_now();
        let claims = Claims {
            sub: principal_id.to_string(),
            role,
            iat: now,
            exp: now + self.ttl_seconds,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| MemoriaError::Auth(format!("Failed to encode token: {e}")))
    }

    /// Verify a token and return its claims.
    ///
    /// Fails with `Unauthenticated` if the signature does not match, the
    /// token is malformed, or the token has expired.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| MemoriaError::Unauthenticated(format!("Invalid token: {e}")))
    }

    /// Seconds until a freshly issued token expires.
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }
}

/// Extract the bearer token from an Authorization header value.
pub fn extract_token_from_header(header: Option<&str>) -> Option<&str> {
    header?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-signing-secret";

    fn service() -> TokenService {
        TokenService::new(SECRET, 30 * 24 * 3600).unwrap()
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let svc = service();
        let token = svc.issue("principal-1", Role::Moderator).unwrap();

        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.sub, "principal-1");
        assert_eq!(claims.role, Role::Moderator);
        assert_eq!(claims.exp, claims.iat + 30 * 24 * 3600);
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let svc = service();
        let token = svc.issue("principal-1", Role::Contributor).unwrap();

        // Flip one character in the signature segment
        let sig_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        bytes[sig_start] = if bytes[sig_start] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(matches!(
            svc.verify(&tampered),
            Err(MemoriaError::Unauthenticated(_))
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().issue("principal-1", Role::Contributor).unwrap();
        let other = TokenService::new("a-different-secret", 3600).unwrap();

        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_malformed_token_rejected() {
        let svc = service();
        assert!(svc.verify("not-a-token").is_err());
        assert!(svc.verify("").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let svc = service();
        // Encode claims that expired well past the default leeway
        let now = unix_now();
        let claims = Claims {
            sub: "principal-1".into(),
            role: Role::Contributor,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            svc.verify(&token),
            Err(MemoriaError::Unauthenticated(_))
        ));
    }

    #[test]
    fn test_extract_token_from_header() {
        assert_eq!(extract_token_from_header(Some("Bearer abc")), Some("abc"));
        assert_eq!(extract_token_from_header(Some("Bearer   abc ")), Some("abc"));
        assert_eq!(extract_token_from_header(Some("Basic abc")), None);
        assert_eq!(extract_token_from_header(Some("Bearer ")), None);
        assert_eq!(extract_token_from_header(None), None);
    }
}
