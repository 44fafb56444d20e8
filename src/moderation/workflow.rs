//! Moderation workflow
//!
//! Every content item moves through one lifecycle: submitted as pending,
//! then approved or rejected by a moderator. Re-deciding an already
//! decided item overwrites the previous decision.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::auth::{allowed, AuthPrincipal, ContentOp};
use crate::db::schemas::{ContentDoc, ContentKind, ContentPayload, ModerationStatus};
use crate::moderation::validate::validate_payload;
use crate::store::{ContentStore, Decision};
use crate::types::{MemoriaError, Result};

/// A moderator's verdict on a pending item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionAction {
    Approve,
    Reject,
}

impl DecisionAction {
    pub fn from_str_opt(value: &str) -> Option<Self> {
        match value {
            "approve" => Some(Self::Approve),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }
}

/// Count of events sharing one event type
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypeCount {
    pub event_type: String,
    pub count: u64,
}

/// Aggregate statistics over the event archive
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStats {
    pub total_events: u64,
    /// Sorted by count, descending
    pub events_by_type: Vec<TypeCount>,
    pub total_casualties: u64,
    pub total_injured: u64,
}

/// Content lifecycle operations, gated by the access policy
#[derive(Clone)]
pub struct Workflow {
    items: Arc<dyn ContentStore>,
}

impl Workflow {
    pub fn new(items: Arc<dyn ContentStore>) -> Self {
        Self { items }
    }

    /// Submit a new item. Always enters the pending state regardless of
    /// anything the client claims about status.
    pub async fn submit(
        &self,
        principal: &AuthPrincipal,
        mut payload: ContentPayload,
    ) -> Result<ContentDoc> {
        if !allowed(Some(principal), ContentOp::Create, None) {
            return Err(MemoriaError::Forbidden(
                "Not allowed to submit content".to_string(),
            ));
        }

        validate_payload(&payload)?;
        normalize_tags(&mut payload);

        let doc = ContentDoc::new(payload, &principal.id);
        let stored = self.items.insert(doc).await?;

        info!(
            "content submitted: kind={} id={} by={}",
            stored.kind(),
            stored.id,
            principal.username
        );
        Ok(stored)
    }

    /// Approve or reject an item. Rejection requires a rationale.
    pub async fn decide(
        &self,
        principal: &AuthPrincipal,
        kind: ContentKind,
        id: &str,
        action: DecisionAction,
        rationale: Option<String>,
    ) -> Result<ContentDoc> {
        // Existence is checked before authority so a moderator probing a
        // bad id and a contributor probing a good one get distinct errors.
        self.find_of_kind(kind, id).await?;

        if !allowed(Some(principal), ContentOp::Decide, None) {
            return Err(MemoriaError::Forbidden(
                "Moderator role required".to_string(),
            ));
        }

        let rationale = rationale.filter(|r| !r.trim().is_empty());
        let (status, rejection_reason) = match action {
            DecisionAction::Approve => (ModerationStatus::Approved, None),
            DecisionAction::Reject => {
                let Some(reason) = rationale else {
                    return Err(MemoriaError::Validation(vec![
                        "rejection_reason".to_string()
                    ]));
                };
                (ModerationStatus::Rejected, Some(reason))
            }
        };

        let decision = Decision {
            status,
            reviewed_by: principal.id.clone(),
            reviewed_at: bson::DateTime::now(),
            rejection_reason,
        };

        let updated = self
            .items
            .apply_decision(id, decision)
            .await?
            .ok_or_else(|| MemoriaError::NotFound(format!("No content item '{id}'")))?;

        info!(
            "content decided: id={} status={} by={}",
            updated.id, updated.status, principal.username
        );
        Ok(updated)
    }

    /// Permanently remove an item.
    pub async fn remove(&self, principal: &AuthPrincipal, kind: ContentKind, id: &str) -> Result<()> {
        self.find_of_kind(kind, id).await?;

        if !allowed(Some(principal), ContentOp::Delete, None) {
            return Err(MemoriaError::Forbidden(
                "Moderator role required".to_string(),
            ));
        }

        if !self.items.delete(id).await? {
            return Err(MemoriaError::NotFound(format!("No content item '{id}'")));
        }

        info!("content deleted: id={} by={}", id, principal.username);
        Ok(())
    }

    /// An id is only addressable through the mount it was submitted
    /// under, so a song id does not resolve via /martyrs routes.
    async fn find_of_kind(&self, kind: ContentKind, id: &str) -> Result<ContentDoc> {
        match self.items.find_by_id(id).await? {
            Some(item) if item.kind() == kind => Ok(item),
            _ => Err(MemoriaError::NotFound(format!("No content item '{id}'"))),
        }
    }

    /// Public read surface: approved items of one kind, newest first.
    pub async fn list_approved(&self, kind: ContentKind) -> Result<Vec<ContentDoc>> {
        self.items
            .list_by_status(kind, ModerationStatus::Approved)
            .await
    }

    /// Moderation queue: pending items of one kind, newest first.
    pub async fn list_pending(
        &self,
        principal: &AuthPrincipal,
        kind: ContentKind,
    ) -> Result<Vec<ContentDoc>> {
        if !allowed(Some(principal), ContentOp::ListAll, None) {
            return Err(MemoriaError::Forbidden(
                "Moderator role required".to_string(),
            ));
        }
        self.items
            .list_by_status(kind, ModerationStatus::Pending)
            .await
    }

    /// Aggregate event statistics across every moderation state.
    pub async fn event_stats(&self) -> Result<EventStats> {
        let events = self.items.list_all(Some(ContentKind::Event)).await?;

        let mut by_type: HashMap<String, u64> = HashMap::new();
        let mut total_casualties: u64 = 0;
        let mut total_injured: u64 = 0;

        for item in &events {
            if let ContentPayload::Event(fields) = &item.payload {
                *by_type.entry(fields.event_type.clone()).or_default() += 1;
                total_casualties += u64::from(fields.casualties);
                total_injured += u64::from(fields.injured);
            }
        }

        let mut events_by_type: Vec<TypeCount> = by_type
            .into_iter()
            .map(|(event_type, count)| TypeCount { event_type, count })
            .collect();
        events_by_type.sort_by(|a, b| b.count.cmp(&a.count).then(a.event_type.cmp(&b.event_type)));

        Ok(EventStats {
            total_events: events.len() as u64,
            events_by_type,
            total_casualties,
            total_injured,
        })
    }

    /// All of the caller's own submissions, any status.
    pub async fn list_mine(
        &self,
        principal: &AuthPrincipal,
        kind: Option<ContentKind>,
    ) -> Result<Vec<ContentDoc>> {
        self.items.list_by_submitter(&principal.id, kind).await
    }

    /// Moderator view over every item regardless of status.
    pub async fn list_all(
        &self,
        principal: &AuthPrincipal,
        kind: Option<ContentKind>,
    ) -> Result<Vec<ContentDoc>> {
        if !allowed(Some(principal), ContentOp::ListAll, None) {
            return Err(MemoriaError::Forbidden(
                "Moderator role required".to_string(),
            ));
        }
        self.items.list_all(kind).await
    }

    /// Fetch a single item, applying read visibility rules. Anonymous
    /// callers denied a read get 401 rather than 403 so clients know
    /// logging in might help.
    pub async fn get(
        &self,
        viewer: Option<&AuthPrincipal>,
        kind: ContentKind,
        id: &str,
    ) -> Result<ContentDoc> {
        let item = self.find_of_kind(kind, id).await?;

        if !allowed(viewer, ContentOp::Read, Some(&item)) {
            return match viewer {
                None => Err(MemoriaError::Unauthenticated(
                    "Authentication required".to_string(),
                )),
                Some(_) => Err(MemoriaError::Forbidden(
                    "Not allowed to view this item".to_string(),
                )),
            };
        }

        Ok(item)
    }
}

fn normalize_tags(payload: &mut ContentPayload) {
    let tags = match payload {
        ContentPayload::Song(fields) => &mut fields.tags,
        ContentPayload::Event(fields) => &mut fields.tags,
        ContentPayload::Martyr(_) => return,
    };
    for tag in tags.iter_mut() {
        *tag = tag.trim().to_lowercase();
    }
}
