//! Authentication and authorization for memoria
//!
//! Provides:
//! - Bearer token issuing and verification (HS256 JWT)
//! - The request-level authentication gate (required/optional modes)
//! - The access policy for content operations
//! - Secret hashing with Argon2

pub mod guard;
pub mod jwt;
pub mod password;
pub mod policy;

pub use guard::{authenticate, authenticate_opt, AuthPrincipal};
pub use jwt::{extract_token_from_header, Claims, TokenService};
pub use password::{hash_secret, verify_secret};
pub use policy::{allowed, ContentOp};
