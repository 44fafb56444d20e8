//! Content endpoints, shared by all three kinds
//!
//! Mounted under /martyrs, /songs, and /events:
//!
//! - POST   /{kind}/submit             — submit a new item (auth)
//! - GET    /{kind}/approved           — published items (public)
//! - GET    /{kind}/user/submissions   — caller's own items (auth)
//! - GET    /{kind}/admin/all          — every item (moderator)
//! - GET    /{kind}/admin/pending      — moderation queue (moderator)
//! - PUT    /{kind}/admin/{id}/approve — approve or reject (moderator)
//! - DELETE /{kind}/admin/{id}         — hard delete (moderator)
//! - GET    /{kind}/{id}               — single item (visibility rules)
//!
//! The events mount additionally serves GET /events/stats, a public
//! aggregate over the event archive.

use std::sync::Arc;

use http_body_util::BodyExt;
use hyper::{body::Incoming, Method, Request, Response, StatusCode};
use serde::Deserialize;

use crate::auth::{authenticate, authenticate_opt, AuthPrincipal};
use crate::db::schemas::{ContentKind, ContentPayload, EventFields, MartyrFields, SongFields};
use crate::moderation::DecisionAction;
use crate::routes::{
    cors_preflight, error_response, get_auth_header, json_response, BoxBody, Envelope,
};
use crate::server::http::AppState;
use crate::types::MemoriaError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DecideRequest {
    /// "approve" or "reject"
    action: String,
    rejection_reason: Option<String>,
}

/// Route a /{kind}/* request
pub async fn handle_content_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    kind: ContentKind,
) -> Response<BoxBody> {
    let path = req.uri().path().to_string();
    let prefix = format!("/{}", kind.path_segment());
    let tail = path
        .strip_prefix(&prefix)
        .unwrap_or("")
        .trim_end_matches('/')
        .to_string();

    match (req.method().clone(), tail.as_str()) {
        (Method::OPTIONS, _) => cors_preflight(),
        (Method::POST, "/submit") => handle_submit(req, state, kind).await,
        (Method::GET, "/approved") => handle_approved(state, kind).await,
        (Method::GET, "/stats") if kind == ContentKind::Event => handle_stats(state).await,
        (Method::GET, "/user/submissions") => handle_my_submissions(req, state, kind).await,
        (Method::GET, "/admin/all") => handle_admin_all(req, state, kind).await,
        (Method::GET, "/admin/pending") => handle_admin_pending(req, state, kind).await,
        (Method::PUT, t) if t.starts_with("/admin/") && t.ends_with("/approve") => {
            let id = t
                .trim_start_matches("/admin/")
                .trim_end_matches("/approve")
                .to_string();
            handle_decide(req, state, kind, id).await
        }
        (Method::DELETE, t) if t.starts_with("/admin/") => {
            let id = t.trim_start_matches("/admin/").to_string();
            handle_delete(req, state, kind, id).await
        }
        (Method::GET, t) if t.len() > 1 && !t[1..].contains('/') => {
            let id = t[1..].to_string();
            handle_get_one(req, state, kind, id).await
        }
        _ => json_response(StatusCode::NOT_FOUND, &Envelope::fail("Not found")),
    }
}

async fn require_auth(
    req: &Request<Incoming>,
    state: &AppState,
) -> Result<AuthPrincipal, MemoriaError> {
    let header = get_auth_header(req).map(ToString::to_string);
    authenticate(&state.tokens, state.users.as_ref(), header.as_deref()).await
}

async fn handle_submit(
    req: Request<Incoming>,
    state: Arc<AppState>,
    kind: ContentKind,
) -> Response<BoxBody> {
    let principal = match require_auth(&req, &state).await {
        Ok(p) => p,
        Err(e) => return error_response(&e),
    };

    let payload = match parse_payload(req, kind).await {
        Ok(p) => p,
        Err(e) => return error_response(&e),
    };

    match state.workflow.submit(&principal, payload).await {
        Ok(item) => json_response(
            StatusCode::CREATED,
            &Envelope::ok_with_message("Submitted for review", item),
        ),
        Err(e) => error_response(&e),
    }
}

/// Deserialize the request body into the kind the route is mounted for.
/// The bare field structs carry no status or submitter slot, so nothing a
/// client smuggles in can influence moderation state.
async fn parse_payload(
    req: Request<Incoming>,
    kind: ContentKind,
) -> Result<ContentPayload, MemoriaError> {
    let body = req
        .collect()
        .await
        .map_err(|e| MemoriaError::Http(format!("Failed to read body: {}", e)))?;

    let bytes = body.to_bytes();
    if bytes.len() > 10240 {
        return Err(MemoriaError::Http("Request body too large".into()));
    }

    let invalid = |e: serde_json::Error| MemoriaError::Http(format!("Invalid JSON: {}", e));

    Ok(match kind {
        ContentKind::Martyr => {
            ContentPayload::Martyr(serde_json::from_slice::<MartyrFields>(&bytes).map_err(invalid)?)
        }
        ContentKind::Song => {
            ContentPayload::Song(serde_json::from_slice::<SongFields>(&bytes).map_err(invalid)?)
        }
        ContentKind::Event => {
            ContentPayload::Event(serde_json::from_slice::<EventFields>(&bytes).map_err(invalid)?)
        }
    })
}

async fn handle_approved(state: Arc<AppState>, kind: ContentKind) -> Response<BoxBody> {
    match state.workflow.list_approved(kind).await {
        Ok(items) => json_response(StatusCode::OK, &Envelope::ok(items)),
        Err(e) => error_response(&e),
    }
}

async fn handle_my_submissions(
    req: Request<Incoming>,
    state: Arc<AppState>,
    kind: ContentKind,
) -> Response<BoxBody> {
    let principal = match require_auth(&req, &state).await {
        Ok(p) => p,
        Err(e) => return error_response(&e),
    };

    match state.workflow.list_mine(&principal, Some(kind)).await {
        Ok(items) => json_response(StatusCode::OK, &Envelope::ok(items)),
        Err(e) => error_response(&e),
    }
}

async fn handle_stats(state: Arc<AppState>) -> Response<BoxBody> {
    match state.workflow.event_stats().await {
        Ok(stats) => json_response(StatusCode::OK, &Envelope::ok(stats)),
        Err(e) => error_response(&e),
    }
}

async fn handle_admin_pending(
    req: Request<Incoming>,
    state: Arc<AppState>,
    kind: ContentKind,
) -> Response<BoxBody> {
    let principal = match require_auth(&req, &state).await {
        Ok(p) => p,
        Err(e) => return error_response(&e),
    };

    match state.workflow.list_pending(&principal, kind).await {
        Ok(items) => json_response(StatusCode::OK, &Envelope::ok(items)),
        Err(e) => error_response(&e),
    }
}

async fn handle_admin_all(
    req: Request<Incoming>,
    state: Arc<AppState>,
    kind: ContentKind,
) -> Response<BoxBody> {
    let principal = match require_auth(&req, &state).await {
        Ok(p) => p,
        Err(e) => return error_response(&e),
    };

    match state.workflow.list_all(&principal, Some(kind)).await {
        Ok(items) => json_response(StatusCode::OK, &Envelope::ok(items)),
        Err(e) => error_response(&e),
    }
}

async fn handle_decide(
    req: Request<Incoming>,
    state: Arc<AppState>,
    kind: ContentKind,
    id: String,
) -> Response<BoxBody> {
    let principal = match require_auth(&req, &state).await {
        Ok(p) => p,
        Err(e) => return error_response(&e),
    };

    let body: DecideRequest = match crate::routes::parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    let Some(action) = DecisionAction::from_str_opt(&body.action) else {
        return error_response(&MemoriaError::Validation(vec!["action".to_string()]));
    };

    match state
        .workflow
        .decide(&principal, kind, &id, action, body.rejection_reason)
        .await
    {
        Ok(item) => json_response(StatusCode::OK, &Envelope::ok(item)),
        Err(e) => error_response(&e),
    }
}

async fn handle_delete(
    req: Request<Incoming>,
    state: Arc<AppState>,
    kind: ContentKind,
    id: String,
) -> Response<BoxBody> {
    let principal = match require_auth(&req, &state).await {
        Ok(p) => p,
        Err(e) => return error_response(&e),
    };

    match state.workflow.remove(&principal, kind, &id).await {
        Ok(()) => json_response(
            StatusCode::OK,
            &Envelope::ok_with_message("Deleted", serde_json::json!({ "id": id })),
        ),
        Err(e) => error_response(&e),
    }
}

async fn handle_get_one(
    req: Request<Incoming>,
    state: Arc<AppState>,
    kind: ContentKind,
    id: String,
) -> Response<BoxBody> {
    // Optional auth: anonymous callers can still read approved items
    let header = get_auth_header(&req).map(ToString::to_string);
    let viewer =
        authenticate_opt(&state.tokens, state.users.as_ref(), header.as_deref()).await;

    match state.workflow.get(viewer.as_ref(), kind, &id).await {
        Ok(item) => json_response(StatusCode::OK, &Envelope::ok(item)),
        Err(e) => error_response(&e),
    }
}
