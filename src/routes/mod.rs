//! HTTP routes for memoria

pub mod auth_routes;
pub mod content;
pub mod health;

pub use auth_routes::handle_auth_request;
pub use content::handle_content_request;
pub use health::health_check;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::types::MemoriaError;

pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Uniform response envelope for every JSON endpoint
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn ok_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

// =============================================================================
// Response Helpers
// =============================================================================

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<BoxBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .body(full_body(json))
        .unwrap()
}

pub fn cors_preflight() -> Response<BoxBody> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .header("Access-Control-Max-Age", "86400")
        .body(empty_body())
        .unwrap()
}

pub fn full_body(data: impl Into<Bytes>) -> BoxBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

pub fn empty_body() -> BoxBody {
    Full::new(Bytes::new())
        .map_err(|never| match never {})
        .boxed()
}

pub async fn parse_json_body<T: for<'de> Deserialize<'de>>(
    req: Request<hyper::body::Incoming>,
) -> Result<T, MemoriaError> {
    let body = req
        .collect()
        .await
        .map_err(|e| MemoriaError::Http(format!("Failed to read body: {}", e)))?;

    let bytes = body.to_bytes();
    if bytes.len() > 10240 {
        return Err(MemoriaError::Http("Request body too large".into()));
    }

    serde_json::from_slice(&bytes)
        .map_err(|e| MemoriaError::Http(format!("Invalid JSON: {}", e)))
}

pub fn get_auth_header(req: &Request<hyper::body::Incoming>) -> Option<&str> {
    req.headers()
        .get(hyper::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

/// Map a domain error to its HTTP response. Internal failures are logged
/// with their detail and reported to the client generically.
pub fn error_response(err: &MemoriaError) -> Response<BoxBody> {
    match err {
        MemoriaError::Validation(fields) => json_response(
            StatusCode::BAD_REQUEST,
            &Envelope::fail(format!("Invalid fields: {}", fields.join(", "))),
        ),
        MemoriaError::Unauthenticated(msg) => {
            json_response(StatusCode::UNAUTHORIZED, &Envelope::fail(msg.clone()))
        }
        MemoriaError::Forbidden(msg) => {
            json_response(StatusCode::FORBIDDEN, &Envelope::fail(msg.clone()))
        }
        MemoriaError::NotFound(msg) => {
            json_response(StatusCode::NOT_FOUND, &Envelope::fail(msg.clone()))
        }
        MemoriaError::Conflict(msg) => {
            json_response(StatusCode::CONFLICT, &Envelope::fail(msg.clone()))
        }
        MemoriaError::Http(msg) => {
            json_response(StatusCode::BAD_REQUEST, &Envelope::fail(msg.clone()))
        }
        MemoriaError::Database(_) | MemoriaError::Config(_) | MemoriaError::Auth(_) => {
            error!("internal error: {}", err);
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &Envelope::fail("Internal server error"),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (
                MemoriaError::Validation(vec!["title".into()]),
                StatusCode::BAD_REQUEST,
            ),
            (
                MemoriaError::Unauthenticated("no token".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (MemoriaError::Forbidden("nope".into()), StatusCode::FORBIDDEN),
            (MemoriaError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (MemoriaError::Conflict("taken".into()), StatusCode::CONFLICT),
            (
                MemoriaError::Database("mongo exploded".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(error_response(&err).status(), expected, "{err:?}");
        }
    }

    #[test]
    fn test_internal_errors_do_not_leak_detail() {
        let resp = error_response(&MemoriaError::Database("secret dsn".into()));
        // Body is built from the generic envelope, never the raw message
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_envelope_shapes() {
        let ok = serde_json::to_value(Envelope::ok(42)).unwrap();
        assert_eq!(ok["success"], true);
        assert_eq!(ok["data"], 42);
        assert!(ok.get("message").is_none());

        let fail = serde_json::to_value(Envelope::fail("bad")).unwrap();
        assert_eq!(fail["success"], false);
        assert_eq!(fail["message"], "bad");
        assert!(fail.get("data").is_none());
    }
}
