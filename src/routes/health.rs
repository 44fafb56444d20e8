//! Health check endpoint
//!
//! GET /health is a liveness probe: 200 whenever the process is serving.
//! It deliberately skips the database so a MongoDB hiccup does not get the
//! pod restarted.

use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::routes::{json_response, BoxBody, Envelope};
use crate::server::http::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
    pub mode: &'static str,
    pub node_id: String,
}

pub async fn health_check(state: Arc<AppState>) -> Response<BoxBody> {
    let body = HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        mode: if state.args.dev_mode { "dev" } else { "production" },
        node_id: state.args.node_id.to_string(),
    };

    json_response(StatusCode::OK, &Envelope::ok(body))
}
