//! API error type and its mapping onto HTTP.
//!
//! Every failure leaves the gateway as
//! `{"error": {"code": "...", "message": "...", "data": ...}}` with the status
//! chosen here.

use axum::extract::rejection::{BytesRejection, JsonRejection, PathRejection, QueryRejection};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use md_01_menu_tree::MalformedMenuTree;
use md_03_object_storage::StorageError;
use serde::Serialize;
use serde_json::json;
use shared_types::BackendError;
use std::fmt;

use crate::application::ServiceError;

/// Stable error codes
pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const VALIDATION_FAILED: &str = "validation_failed";
    pub const MALFORMED_MENU_TREE: &str = "malformed_menu_tree";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const NOT_FOUND: &str = "not_found";
    pub const CONFLICT: &str = "conflict";
    pub const PAYLOAD_TOO_LARGE: &str = "payload_too_large";
    pub const REQUEST_TIMEOUT: &str = "request_timeout";
    pub const PARTIAL_REPLACE: &str = "partial_replace";
    pub const UPSTREAM_REJECTED: &str = "upstream_rejected";
    pub const UNAVAILABLE: &str = "unavailable";
    pub const INTERNAL: &str = "internal";
}

/// Gateway error with status and stable code
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn bad_request(details: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, details)
    }

    pub fn unauthorized(details: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, codes::UNAUTHORIZED, details)
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            codes::NOT_FOUND,
            format!("Not found: {}", resource.into()),
        )
    }

    pub fn timeout(limit: std::time::Duration) -> Self {
        Self::new(
            StatusCode::REQUEST_TIMEOUT,
            codes::REQUEST_TIMEOUT,
            format!("request exceeded {} ms", limit.as_millis()),
        )
    }

    pub fn unavailable(details: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, codes::UNAVAILABLE, details)
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::INTERNAL,
            format!("Internal error: {}", details.into()),
        )
    }

    pub fn malformed_tree(err: &MalformedMenuTree) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::MALFORMED_MENU_TREE, err.to_string()).with_data(
            json!({
                "path": err.path.to_string(),
                "reason": err.reason.code(),
            }),
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl Serialize for ApiError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ApiError", 3)?;
        state.serialize_field("code", self.code)?;
        state.serialize_field("message", &self.message)?;
        if let Some(ref data) = self.data {
            state.serialize_field("data", data)?;
        }
        state.end()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::warn!(
                status = self.status.as_u16(),
                code = self.code,
                error = %self.message,
                "request failed"
            );
        }
        let status = self.status;
        let unauthorized = status == StatusCode::UNAUTHORIZED;
        let mut response = (status, Json(json!({ "error": self }))).into_response();
        if unauthorized {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound(what) => ApiError::not_found(what),
            BackendError::Unauthorized(msg) => ApiError::unauthorized(msg),
            BackendError::Conflict(msg) => ApiError::new(StatusCode::CONFLICT, codes::CONFLICT, msg),
            BackendError::Invalid(msg) => ApiError::bad_request(msg),
            BackendError::Unavailable(msg) => ApiError::unavailable(msg),
            BackendError::Internal(msg) => ApiError::internal(msg),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            e if e.is_client_error() => ApiError::bad_request(e.to_string()),
            StorageError::Rejected { status, message } => ApiError::new(
                StatusCode::BAD_GATEWAY,
                codes::UPSTREAM_REJECTED,
                format!("object store rejected the upload ({})", status),
            )
            .with_data(json!({ "status": status, "detail": message })),
            StorageError::Unavailable(msg) => ApiError::unavailable(msg),
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(fields) => ApiError::new(
                StatusCode::BAD_REQUEST,
                codes::VALIDATION_FAILED,
                "please check the submitted fields",
            )
            .with_data(json!({ "fields": fields })),
            ServiceError::MalformedTree(e) => ApiError::malformed_tree(&e),
            ServiceError::BadRequest(msg) => ApiError::bad_request(msg),
            ServiceError::PayloadTooLarge { size, max } => ApiError::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                codes::PAYLOAD_TOO_LARGE,
                format!("payload of {} bytes exceeds {} bytes", size, max),
            ),
            ServiceError::PartialReplace { removed, cause } => ApiError::new(
                StatusCode::BAD_GATEWAY,
                codes::PARTIAL_REPLACE,
                format!(
                    "removed {} existing todos but inserting replacements failed: {}",
                    removed, cause
                ),
            )
            .with_data(json!({ "removed": removed, "cause": cause.kind().as_str() })),
            ServiceError::Backend(e) => e.into(),
            ServiceError::Storage(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        body_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        body_rejection(rejection.status(), rejection.body_text())
    }
}

fn body_rejection(status: StatusCode, text: String) -> ApiError {
    let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
        codes::PAYLOAD_TOO_LARGE
    } else {
        codes::BAD_REQUEST
    };
    ApiError::new(status, code, text)
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Server-level errors
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// Server stopped with an error
    #[error("server error: {0}")]
    Serve(String),
}
