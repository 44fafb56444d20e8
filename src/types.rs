//! Error types for memoria
//!
//! One taxonomy for the whole service: business-rule failures are mapped
//! to HTTP statuses at the route boundary; infrastructure failures are
//! logged in full server-side and surfaced to callers as a generic message.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemoriaError {
    /// Malformed or missing input; carries the offending field names.
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// No valid proof of identity (missing/invalid/expired token,
    /// unknown principal, bad credentials).
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Valid identity, insufficient role or ownership.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Referenced entity is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Uniqueness violation at registration.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Storage failure.
    #[error("database error: {0}")]
    Database(String),

    /// Invalid or incomplete configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Request-level transport failure (unreadable body, oversized payload).
    #[error("http error: {0}")]
    Http(String),

    /// Internal auth machinery failure (hashing, token encoding).
    #[error("auth error: {0}")]
    Auth(String),
}

impl MemoriaError {
    /// Single-field validation failure.
    pub fn invalid_field(field: impl Into<String>) -> Self {
        MemoriaError::Validation(vec![field.into()])
    }
}

pub type Result<T> = std::result::Result<T, MemoriaError>;
