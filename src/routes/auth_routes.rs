//! Authentication endpoints
//!
//! - POST /auth/register — create an account, returns a bearer token
//! - POST /auth/login    — exchange credentials for a bearer token
//! - GET  /auth/me       — identify the caller from their token

use std::sync::Arc;

use hyper::{body::Incoming, Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{authenticate, hash_secret, verify_secret};
use crate::db::schemas::{Role, UserDoc, UserSummary};
use crate::routes::{
    cors_preflight, error_response, get_auth_header, json_response, parse_json_body, BoxBody,
    Envelope,
};
use crate::server::http::AppState;
use crate::types::MemoriaError;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token grant returned by register and login
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    pub user: UserSummary,
    pub token: String,
    /// Unix timestamp when the token stops being accepted
    pub expires_at: u64,
}

/// Route an /auth/* request
pub async fn handle_auth_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let path = req.uri().path().to_string();

    match (req.method().clone(), path.as_str()) {
        (Method::OPTIONS, _) => cors_preflight(),
        (Method::POST, "/auth/register") => handle_register(req, state).await,
        (Method::POST, "/auth/login") => handle_login(req, state).await,
        (Method::GET, "/auth/me") => handle_me(req, state).await,
        (_, "/auth/register") | (_, "/auth/login") | (_, "/auth/me") => json_response(
            StatusCode::METHOD_NOT_ALLOWED,
            &Envelope::fail("Method not allowed"),
        ),
        _ => json_response(StatusCode::NOT_FOUND, &Envelope::fail("Not found")),
    }
}

async fn handle_register(req: Request<Incoming>, state: Arc<AppState>) -> Response<BoxBody> {
    let body: RegisterRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    if let Err(e) = validate_registration(&body) {
        return error_response(&e);
    }

    let password_hash = match hash_secret(&body.password) {
        Ok(h) => h,
        Err(e) => return error_response(&e),
    };

    let user = UserDoc::new(&body.username, &body.email, &password_hash, Role::Contributor);

    let stored = match state.users.create(user).await {
        Ok(u) => u,
        Err(e) => return error_response(&e),
    };

    info!("user registered: {}", stored.username);

    match grant(&state, &stored) {
        Ok(data) => json_response(
            StatusCode::CREATED,
            &Envelope::ok_with_message("Account created", data),
        ),
        Err(e) => error_response(&e),
    }
}

async fn handle_login(req: Request<Incoming>, state: Arc<AppState>) -> Response<BoxBody> {
    let body: LoginRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    // One generic message for both unknown email and wrong password so a
    // caller cannot probe which emails are registered.
    let denied = || {
        error_response(&MemoriaError::Unauthenticated(
            "Invalid email or password".to_string(),
        ))
    };

    let email = body.email.trim().to_lowercase();
    let user = match state.users.find_by_email(&email).await {
        Ok(Some(u)) => u,
        Ok(None) => return denied(),
        Err(e) => return error_response(&e),
    };

    match verify_secret(&body.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => return denied(),
        Err(e) => return error_response(&e),
    }

    info!("user logged in: {}", user.username);

    match grant(&state, &user) {
        Ok(data) => json_response(StatusCode::OK, &Envelope::ok(data)),
        Err(e) => error_response(&e),
    }
}

async fn handle_me(req: Request<Incoming>, state: Arc<AppState>) -> Response<BoxBody> {
    let auth_header = get_auth_header(&req).map(ToString::to_string);

    // The gate already resolved the full principal from the store
    let principal = match authenticate(&state.tokens, state.users.as_ref(), auth_header.as_deref())
        .await
    {
        Ok(p) => p,
        Err(e) => return error_response(&e),
    };

    json_response(StatusCode::OK, &Envelope::ok(UserSummary::from(&principal)))
}

fn grant(state: &AppState, user: &UserDoc) -> Result<AuthData, MemoriaError> {
    let token = state.tokens.issue(&user.id, user.role)?;
    let expires_at = crate::auth::jwt::unix_now() + state.tokens.ttl_seconds();

    Ok(AuthData {
        user: UserSummary::from(user),
        token,
        expires_at,
    })
}

fn validate_registration(body: &RegisterRequest) -> Result<(), MemoriaError> {
    let mut invalid = Vec::new();

    let username = body.username.trim();
    if username.len() < 3 || username.len() > 30 {
        invalid.push("username".to_string());
    }
    if !body.email.contains('@') {
        invalid.push("email".to_string());
    }
    if body.password.len() < 8 {
        invalid.push("password".to_string());
    }

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(MemoriaError::Validation(invalid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_registration_validation() {
        assert!(validate_registration(&register("alice", "a@x.test", "longenough")).is_ok());

        let err =
            validate_registration(&register("al", "nodomain", "short")).unwrap_err();
        match err {
            MemoriaError::Validation(fields) => {
                assert_eq!(fields, vec!["username", "email", "password"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_username_length_bounds() {
        assert!(validate_registration(&register("abc", "a@x.test", "password1")).is_ok());
        let long = "x".repeat(31);
        assert!(validate_registration(&register(&long, "a@x.test", "password1")).is_err());
    }
}
