//! Access policy for content operations
//!
//! A pure mapping of (principal, operation, item) to allow/deny. Consulted
//! by the moderation workflow and the query routes; anything not explicitly
//! allowed here is denied.

use crate::auth::guard::AuthPrincipal;
use crate::db::schemas::{ContentDoc, ModerationStatus};

/// Operations over content items subject to the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentOp {
    /// Read a single item or list items
    Read,
    /// Submit a new item
    Create,
    /// Approve or reject an item
    Decide,
    /// Hard-delete an item
    Delete,
    /// List every item regardless of state
    ListAll,
}

/// Decide whether `principal` may perform `op`, optionally against a
/// concrete `item`. Rules, in priority order:
///
/// 1. Reading an approved item is allowed for anyone, including anonymous.
/// 2. Reading anything else requires a principal: moderators read any
///    state, everyone else only their own submissions.
/// 3. Creating requires any authenticated principal (the workflow forces
///    the initial state to pending regardless of request content).
/// 4. Deciding, deleting, and unrestricted listing require a moderator.
pub fn allowed(
    principal: Option<&AuthPrincipal>,
    op: ContentOp,
    item: Option<&ContentDoc>,
) -> bool {
    match op {
        ContentOp::Read => match item {
            Some(item) if item.status == ModerationStatus::Approved => true,
            Some(item) => match principal {
                Some(p) => p.role.is_moderator() || item.submitted_by == p.id,
                None => false,
            },
            // Listing across unapproved states; callers scope the result
            // to the principal's own submissions unless ListAll applies.
            None => principal.is_some(),
        },
        ContentOp::Create => principal.is_some(),
        ContentOp::Decide | ContentOp::Delete | ContentOp::ListAll => {
            matches!(principal, Some(p) if p.role.is_moderator())
        }
    }
}
