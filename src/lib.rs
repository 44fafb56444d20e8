//! Memoria - archival content submission and moderation service
//!
//! Registered contributors submit archival records (martyr biographies,
//! songs, timeline events); moderators review them and decide what gets
//! published. Approved items are publicly readable; everything else is
//! visible only to its submitter and to moderators.

pub mod auth;
pub mod config;
pub mod db;
pub mod moderation;
pub mod routes;
pub mod server;
pub mod store;
pub mod types;

pub use types::{MemoriaError, Result};
