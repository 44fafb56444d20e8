//! Content item document schema
//!
//! One generic document for every submitted archival record: a
//! kind-discriminated payload (martyr record, song reference, timeline
//! event) wrapped in a common moderation envelope. The workflow engine
//! operates uniformly over the envelope.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for content items
pub const CONTENT_COLLECTION: &str = "content_items";

/// Content kind discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Martyr,
    Song,
    Event,
}

impl ContentKind {
    /// Map a URL path segment (plural form) to a kind.
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        match segment {
            "martyrs" => Some(ContentKind::Martyr),
            "songs" => Some(ContentKind::Song),
            "events" => Some(ContentKind::Event),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Martyr => "martyr",
            ContentKind::Song => "song",
            ContentKind::Event => "event",
        }
    }

    /// Plural URL path segment this kind is mounted under.
    pub fn path_segment(self) -> &'static str {
        match self {
            ContentKind::Martyr => "martyrs",
            ContentKind::Song => "songs",
            ContentKind::Event => "events",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Moderation state of a content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ModerationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ModerationStatus::Pending => "pending",
            ModerationStatus::Approved => "approved",
            ModerationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Opaque reference to an uploaded media object. The blob store is an
/// external collaborator; memoria never inspects the binary content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRef {
    /// "image" or "video"
    pub media_kind: String,
    /// Stable path/URL issued by the blob collaborator
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Biographical record of a martyr
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MartyrFields {
    pub name: String,
    pub english_name: String,
    pub date_of_martyrdom: String,
    pub location: String,
    pub age: u32,
    pub background: String,
    pub life_story: String,
    pub quote: String,
    pub contribution: String,
    pub impact: String,
}

/// Music reference
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongFields {
    pub title: String,
    pub artist: String,
    pub description: String,
    pub youtube_link: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Timeline event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFields {
    pub title: String,
    pub description: String,
    pub event_type: String,
    /// RFC3339 timestamp or plain YYYY-MM-DD date
    pub date: String,
    pub location: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub media: Vec<MediaRef>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub casualties: u32,
    #[serde(default)]
    pub injured: u32,
}

/// Kind-specific payload of a content item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentPayload {
    Martyr(MartyrFields),
    Song(SongFields),
    Event(EventFields),
}

impl ContentPayload {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentPayload::Martyr(_) => ContentKind::Martyr,
            ContentPayload::Song(_) => ContentKind::Song,
            ContentPayload::Event(_) => ContentKind::Event,
        }
    }
}

/// Content item document stored in MongoDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at)
    #[serde(default)]
    pub metadata: Metadata,

    /// Stable item id used in the API
    pub id: String,

    /// Kind discriminator + kind-specific fields (flattened)
    #[serde(flatten)]
    pub payload: ContentPayload,

    /// Submitting principal id. Immutable after creation.
    pub submitted_by: String,

    /// Moderation state. Always pending at creation; never client-controlled.
    #[serde(default)]
    pub status: ModerationStatus,

    /// Deciding moderator id; set together with `reviewed_at` on any decision
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,

    /// Decision timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime>,

    /// Present iff status is rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl ContentDoc {
    /// Create a new pending item for a submitter.
    pub fn new(payload: ContentPayload, submitted_by: &str) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            id: Uuid::new_v4().to_string(),
            payload,
            submitted_by: submitted_by.to_string(),
            status: ModerationStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            rejection_reason: None,
        }
    }

    pub fn kind(&self) -> ContentKind {
        self.payload.kind()
    }
}

impl IntoIndexes for ContentDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("id_unique".to_string())
                        .build(),
                ),
            ),
            // Moderation listings: by kind and status, newest first
            (
                doc! { "kind": 1, "status": 1, "metadata.created_at": -1 },
                Some(
                    IndexOptions::builder()
                        .name("kind_status_created".to_string())
                        .build(),
                ),
            ),
            // "my submissions" lookups
            (
                doc! { "submitted_by": 1 },
                Some(
                    IndexOptions::builder()
                        .name("submitted_by_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for ContentDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song_json() -> serde_json::Value {
        serde_json::json!({
            "kind": "song",
            "id": "item-1",
            "title": "Anthem",
            "artist": "X",
            "description": "d",
            "youtubeLink": "https://youtube.com/watch?v=1",
            "submitted_by": "user-1",
            "status": "pending"
        })
    }

    #[test]
    fn test_kind_from_path_segment() {
        assert_eq!(ContentKind::from_path_segment("songs"), Some(ContentKind::Song));
        assert_eq!(ContentKind::from_path_segment("martyrs"), Some(ContentKind::Martyr));
        assert_eq!(ContentKind::from_path_segment("events"), Some(ContentKind::Event));
        assert_eq!(ContentKind::from_path_segment("anything"), None);
    }

    #[test]
    fn test_payload_roundtrip_with_kind_tag() {
        let doc: ContentDoc = serde_json::from_value(song_json()).unwrap();
        assert_eq!(doc.kind(), ContentKind::Song);
        assert_eq!(doc.status, ModerationStatus::Pending);

        let out = serde_json::to_value(&doc).unwrap();
        assert_eq!(out["kind"], "song");
        assert_eq!(out["title"], "Anthem");
        // Unset decision fields are omitted entirely
        assert!(out.get("reviewed_by").is_none());
        assert!(out.get("rejection_reason").is_none());
    }

    #[test]
    fn test_new_item_is_pending() {
        let doc = ContentDoc::new(
            ContentPayload::Song(SongFields {
                title: "Anthem".into(),
                artist: "X".into(),
                description: "d".into(),
                youtube_link: "https://youtu.be/1".into(),
                tags: vec![],
            }),
            "user-1",
        );
        assert_eq!(doc.status, ModerationStatus::Pending);
        assert!(doc.reviewed_by.is_none());
        assert!(doc.reviewed_at.is_none());
        assert!(doc.metadata.created_at.is_some());
    }
}
