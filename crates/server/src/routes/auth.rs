use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::warn;

use crate::errors::ApiError;
use crate::routes::AppState;

pub const REALM: &str = r#"Basic realm="json-kv""#;

const MISSING_HEADER: &str = "Unauthorized: Missing Authorization Header";
const INVALID_FORMAT: &str = "Unauthorized: Invalid Authentication Format";
const INVALID_CREDENTIALS: &str = "Unauthorized: Invalid Credentials";

fn unauthorized(message: &'static str) -> Response {
    let mut resp = ApiError::new(StatusCode::UNAUTHORIZED, message).into_response();
    resp.headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(REALM));
    resp
}

/// Split a base64 `user:password` token. The password may contain colons.
pub fn decode_basic(encoded: &str) -> Option<(String, String)> {
    let bytes = STANDARD.decode(encoded.trim()).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    let (user, pass) = text.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

/// Middleware: require valid HTTP Basic credentials for store routes
pub async fn require_basic_auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let Some(raw) = req.headers().get(header::AUTHORIZATION) else {
        warn!(path = %req.uri().path(), reason = "missing_header", "auth_rejected");
        return unauthorized(MISSING_HEADER);
    };

    let credentials = raw
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Basic "))
        .and_then(decode_basic);
    let Some((user, pass)) = credentials else {
        warn!(path = %req.uri().path(), reason = "invalid_format", "auth_rejected");
        return unauthorized(INVALID_FORMAT);
    };

    if !state.verifier.verify(&user, &pass) {
        warn!(path = %req.uri().path(), %user, reason = "invalid_credentials", "auth_rejected");
        return unauthorized(INVALID_CREDENTIALS);
    }

    next.run(req).await
}
