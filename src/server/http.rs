//! HTTP server
//!
//! hyper http1 with TokioIo, one spawned task per connection. Routing is
//! prefix-based: /auth, /health, and one mount per content kind.

use std::net::SocketAddr;
use std::sync::Arc;

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::auth::TokenService;
use crate::config::Args;
use crate::db::schemas::ContentKind;
use crate::moderation::Workflow;
use crate::routes;
use crate::routes::{json_response, BoxBody, Envelope};
use crate::store::{ContentStore, CredentialStore};
use crate::types::MemoriaError;

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub tokens: TokenService,
    pub users: Arc<dyn CredentialStore>,
    pub content: Arc<dyn ContentStore>,
    pub workflow: Workflow,
}

impl AppState {
    pub fn new(
        args: Args,
        tokens: TokenService,
        users: Arc<dyn CredentialStore>,
        content: Arc<dyn ContentStore>,
    ) -> Self {
        let workflow = Workflow::new(Arc::clone(&content));
        Self {
            args,
            tokens,
            users,
            content,
            workflow,
        }
    }
}

pub async fn run(state: Arc<AppState>) -> Result<(), MemoriaError> {
    let listener = TcpListener::bind(state.args.listen)
        .await
        .map_err(|e| MemoriaError::Http(format!("Failed to bind {}: {}", state.args.listen, e)))?;

    info!(
        "Memoria listening on {} as node {}",
        state.args.listen, state.args.node_id
    );

    if state.args.dev_mode {
        warn!("Development mode enabled - data is held in memory only");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .preserve_header_case(true)
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    if path.starts_with("/auth") {
        return Ok(routes::handle_auth_request(req, state).await);
    }

    if method == Method::GET && (path == "/health" || path == "/healthz") {
        return Ok(routes::health_check(state).await);
    }

    // First path segment selects the content kind
    if let Some(kind) = path
        .split('/')
        .nth(1)
        .and_then(ContentKind::from_path_segment)
    {
        return Ok(routes::handle_content_request(req, state, kind).await);
    }

    if method == Method::OPTIONS {
        return Ok(routes::cors_preflight());
    }

    Ok(json_response(
        StatusCode::NOT_FOUND,
        &Envelope::fail(format!("No route for {}", path)),
    ))
}
