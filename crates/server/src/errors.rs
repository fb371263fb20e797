use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use service::StoreError;
use thiserror::Error;
use tracing::{debug, error};

/// Error rendered as `{"error": ..., "code": ...}` with a matching status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub code: Option<u16>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), code: None }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

/// Code carried by request bodies that never reach the store.
pub const BAD_BODY_CODE: u16 = 1000;

/// Status for each store error kind.
pub fn status_for(err: &StoreError) -> StatusCode {
    match err {
        StoreError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        e if e.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self { status: status_for(&err), message: err.to_string(), code: Some(err.code()) }
    }
}

/// Any unreadable body (bad syntax, wrong field types, missing
/// Content-Type) is a plain 400 in the usual envelope.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: format!("Invalid request body: {}", rejection.body_text()),
            code: Some(BAD_BODY_CODE),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.message, "request failed");
        } else {
            debug!(status = %self.status, error = %self.message, "request rejected");
        }
        let body = ErrorBody { error: self.message, code: self.code };
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_statuses() {
        assert_eq!(status_for(&StoreError::not_found("k")), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&StoreError::EmptyKey), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&StoreError::KeyTooLong { len: 300, max: 256 }), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&StoreError::MalformedJson("eof".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&StoreError::duplicate("k")), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&StoreError::Io("disk".into())), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for(&StoreError::Parse("bad".into())), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn api_error_carries_code() {
        let err = ApiError::from(StoreError::duplicate("user1"));
        assert_eq!(err.code, Some(2001));
        assert_eq!(err.message, "key already exists: user1");
    }
}
