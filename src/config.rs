//! Configuration for memoria
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use uuid::Uuid;

/// Memoria - submission and moderation gateway for remembrance archives
#[derive(Parser, Debug, Clone)]
#[command(name = "memoria")]
#[command(about = "Submission and moderation gateway for community remembrance archives")]
pub struct Args {
    /// Unique node identifier for this gateway instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "memoria")]
    pub mongodb_db: String,

    /// Secret key for bearer token signing (required in every mode)
    #[arg(long, env = "TOKEN_SECRET")]
    pub token_secret: Option<String>,

    /// Bearer token lifetime in seconds (default 30 days)
    #[arg(long, env = "TOKEN_TTL_SECONDS", default_value = "2592000")]
    pub token_ttl_seconds: u64,

    /// Enable development mode (in-memory stores instead of MongoDB)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Email for the seeded moderator account (optional; created at startup)
    #[arg(long, env = "MODERATOR_EMAIL")]
    pub moderator_email: Option<String>,

    /// Username for the seeded moderator account
    #[arg(long, env = "MODERATOR_USERNAME", default_value = "moderator")]
    pub moderator_username: String,

    /// Password for the seeded moderator account
    #[arg(long, env = "MODERATOR_PASSWORD")]
    pub moderator_password: Option<String>,
}

impl Args {
    /// Validate configuration.
    ///
    /// A missing signing secret is a fatal startup error in every mode: a
    /// predictable key would void every token guarantee, so there is
    /// deliberately no development fallback. Dev mode only swaps the
    /// storage backend.
    pub fn validate(&self) -> Result<(), String> {
        match &self.token_secret {
            None => return Err("TOKEN_SECRET is required".to_string()),
            Some(s) if s.trim().is_empty() => {
                return Err("TOKEN_SECRET must not be empty".to_string())
            }
            Some(_) => {}
        }

        if self.token_ttl_seconds == 0 {
            return Err("TOKEN_TTL_SECONDS must be positive".to_string());
        }

        if self.moderator_email.is_some() != self.moderator_password.is_some() {
            return Err("MODERATOR_EMAIL and MODERATOR_PASSWORD must be set together".to_string());
        }

        Ok(())
    }

    /// The configured signing secret. Only meaningful after `validate()`.
    pub fn token_secret(&self) -> &str {
        self.token_secret.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let args = Args::parse_from(["memoria", "--token-secret", "unit-test-secret"]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_missing_token_secret_is_fatal() {
        let args = Args::parse_from(["memoria"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_empty_token_secret_is_fatal() {
        let args = Args::parse_from(["memoria", "--token-secret", "  "]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_moderator_seed_requires_both_fields() {
        let args = Args::parse_from([
            "memoria",
            "--token-secret",
            "unit-test-secret",
            "--moderator-email",
            "mod@example.test",
        ]);
        assert!(args.validate().is_err());
    }
}
