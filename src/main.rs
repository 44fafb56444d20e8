//! Memoria - archival content submission and moderation service

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use memoria::{
    auth::{hash_secret, TokenService},
    config::Args,
    db::MongoClient,
    db::schemas::{Role, UserDoc},
    server::{self, AppState},
    store::{
        memory::{MemoryContentStore, MemoryCredentialStore},
        mongo::{MongoContentStore, MongoCredentialStore},
        ContentStore, CredentialStore,
    },
    types::MemoriaError,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("memoria={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Memoria - Archival Content Service");
    info!("======================================");
    info!("Node ID: {}", args.node_id);
    info!("Listen: {}", args.listen);
    info!(
        "Mode: {}",
        if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" }
    );
    info!("MongoDB: {}", args.mongodb_uri);
    info!("Token TTL: {}s", args.token_ttl_seconds);
    info!("======================================");

    let tokens = match TokenService::new(args.token_secret(), args.token_ttl_seconds) {
        Ok(t) => t,
        Err(e) => {
            error!("Token service error: {}", e);
            std::process::exit(1);
        }
    };

    let (users, content): (Arc<dyn CredentialStore>, Arc<dyn ContentStore>) = if args.dev_mode {
        warn!("Dev mode: using in-memory stores, data is lost on restart");
        (
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(MemoryContentStore::new()),
        )
    } else {
        let mongo = match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
            Ok(client) => {
                info!("MongoDB connected successfully");
                client
            }
            Err(e) => {
                error!("MongoDB connection failed: {}", e);
                std::process::exit(1);
            }
        };

        let users = match MongoCredentialStore::new(&mongo).await {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to initialize user collection: {}", e);
                std::process::exit(1);
            }
        };
        let content = match MongoContentStore::new(&mongo).await {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to initialize content collection: {}", e);
                std::process::exit(1);
            }
        };

        (Arc::new(users), Arc::new(content))
    };

    if let Err(e) = seed_moderator(&args, users.as_ref()).await {
        error!("Failed to seed moderator account: {}", e);
        std::process::exit(1);
    }

    let state = Arc::new(AppState::new(args, tokens, users, content));

    server::run(state).await?;

    Ok(())
}

/// Create the configured moderator account if it does not already exist.
async fn seed_moderator(args: &Args, users: &dyn CredentialStore) -> Result<(), MemoriaError> {
    let (Some(email), Some(password)) = (&args.moderator_email, &args.moderator_password) else {
        return Ok(());
    };

    let hash = hash_secret(password)?;
    let user = UserDoc::new(&args.moderator_username, email, &hash, Role::Moderator);

    match users.create(user).await {
        Ok(created) => {
            info!("Seeded moderator account '{}'", created.username);
            Ok(())
        }
        Err(MemoriaError::Conflict(_)) => {
            info!("Moderator account already exists, skipping seed");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
