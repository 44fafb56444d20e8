//! Authentication gate
//!
//! Resolves a bearer token from the Authorization header into an
//! authenticated principal. One pipeline, two entry points:
//!
//! - [`authenticate`] (required mode): any failure is an error the caller
//!   maps to 401.
//! - [`authenticate_opt`] (optional mode): failures are swallowed and the
//!   request proceeds anonymously.
//!
//! The gate never mutates the credential store.

use crate::auth::jwt::{extract_token_from_header, TokenService};
use crate::db::schemas::{Role, UserSummary};
use crate::store::CredentialStore;
use crate::types::{MemoriaError, Result};

/// An authenticated principal attached to a request.
#[derive(Debug, Clone)]
pub struct AuthPrincipal {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<&AuthPrincipal> for UserSummary {
    fn from(principal: &AuthPrincipal) -> Self {
        Self {
            id: principal.id.clone(),
            username: principal.username.clone(),
            email: principal.email.clone(),
            role: principal.role,
        }
    }
}

/// Required mode: resolve the Authorization header into a principal.
///
/// Fails with `Unauthenticated` when no token is present, when token
/// verification fails, or when the verified principal id no longer
/// resolves in the credential store.
pub async fn authenticate(
    tokens: &TokenService,
    users: &dyn CredentialStore,
    auth_header: Option<&str>,
) -> Result<AuthPrincipal> {
    let token = extract_token_from_header(auth_header)
        .ok_or_else(|| MemoriaError::Unauthenticated("No token provided".into()))?;

    let claims = tokens.verify(token)?;

    let user = users
        .find_by_id(&claims.sub)
        .await?
        .ok_or_else(|| MemoriaError::Unauthenticated("Unknown principal".into()))?;

    Ok(AuthPrincipal {
        id: user.id,
        username: user.username,
        email: user.email,
        role: user.role,
    })
}

/// Optional mode: same pipeline, but any failure yields an anonymous
/// request instead of an error.
pub async fn authenticate_opt(
    tokens: &TokenService,
    users: &dyn CredentialStore,
    auth_header: Option<&str>,
) -> Option<AuthPrincipal> {
    authenticate(tokens, users, auth_header).await.ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_secret;
    use crate::db::schemas::UserDoc;
    use crate::store::memory::MemoryCredentialStore;

    async fn setup() -> (TokenService, MemoryCredentialStore, UserDoc) {
        let tokens = TokenService::new("guard-test-secret", 3600).unwrap();
        let users = MemoryCredentialStore::new();
        let user = users
            .create(UserDoc::new(
                "alice",
                "alice@x.test",
                &hash_secret("pw123456").unwrap(),
                Role::Contributor,
            ))
            .await
            .unwrap();
        (tokens, users, user)
    }

    #[tokio::test]
    async fn test_required_mode_resolves_principal() {
        let (tokens, users, user) = setup().await;
        let token = tokens.issue(&user.id, user.role).unwrap();
        let header = format!("Bearer {token}");

        let principal = authenticate(&tokens, &users, Some(&header)).await.unwrap();
        assert_eq!(principal.id, user.id);
        assert_eq!(principal.username, "alice");
        assert_eq!(principal.role, Role::Contributor);
    }

    #[tokio::test]
    async fn test_required_mode_rejects_missing_token() {
        let (tokens, users, _) = setup().await;

        let err = authenticate(&tokens, &users, None).await.unwrap_err();
        assert!(matches!(err, MemoriaError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn test_required_mode_rejects_unknown_principal() {
        let (tokens, users, _) = setup().await;
        // Token for an id that was never registered
        let token = tokens.issue("ghost", Role::Moderator).unwrap();
        let header = format!("Bearer {token}");

        let err = authenticate(&tokens, &users, Some(&header)).await.unwrap_err();
        assert!(matches!(err, MemoriaError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn test_principal_converts_to_summary_without_store_access() {
        let (tokens, users, user) = setup().await;
        let token = tokens.issue(&user.id, user.role).unwrap();
        let header = format!("Bearer {token}");

        let principal = authenticate(&tokens, &users, Some(&header)).await.unwrap();
        let summary = UserSummary::from(&principal);
        assert_eq!(summary.id, user.id);
        assert_eq!(summary.username, "alice");
        assert_eq!(summary.email, "alice@x.test");
        assert_eq!(summary.role, Role::Contributor);
    }

    #[tokio::test]
    async fn test_optional_mode_swallows_failures() {
        let (tokens, users, user) = setup().await;

        assert!(authenticate_opt(&tokens, &users, None).await.is_none());
        assert!(authenticate_opt(&tokens, &users, Some("Bearer junk"))
            .await
            .is_none());

        let token = tokens.issue(&user.id, user.role).unwrap();
        let header = format!("Bearer {token}");
        assert!(authenticate_opt(&tokens, &users, Some(&header))
            .await
            .is_some());
    }
}
