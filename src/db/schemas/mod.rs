//! Database schemas for memoria
//!
//! Defines MongoDB document structures for principals and content items.

mod content;
mod metadata;
mod user;

pub use content::{
    ContentDoc, ContentKind, ContentPayload, EventFields, MartyrFields, MediaRef,
    ModerationStatus, SongFields, CONTENT_COLLECTION,
};
pub use metadata::Metadata;
pub use user::{Role, UserDoc, UserSummary, USER_COLLECTION};
