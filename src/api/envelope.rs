//! JSON envelope shared by every endpoint.
//!
//! Success bodies are `{ "data": ..., "meta": ... }`. Failures are
//! `{ "error": { "code", "message" }, "meta": ... }` where `code` is one of
//! the [`ErrorCode`] values and fixes the HTTP status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{EngineError, ErrorKind};

/// API revision reported in every `meta` block.
pub const API_VERSION: &str = "2";

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
}

impl ResponseMeta {
    fn now() -> Self {
        Self {
            timestamp: Utc::now(),
            version: API_VERSION,
        }
    }
}

/// Machine-readable failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Body could not be decoded into the request type.
    BadRequest,
    /// Driver value, mix component or bag spec rejected by the engine.
    DomainInput,
    NotFound,
    /// Session store is full.
    SessionLimit,
    /// Plant config lacks something the projection needs.
    ConfigurationError,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::BadRequest | ErrorCode::DomainInput => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::SessionLimit => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::ConfigurationError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ErrorKind> for ErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::DomainInput => ErrorCode::DomainInput,
            ErrorKind::Configuration => ErrorCode::ConfigurationError,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Response {
        (StatusCode::OK, Json(Self::wrap(data))).into_response()
    }

    /// `201 Created`, used when a session is opened.
    pub fn created(data: T) -> Response {
        (StatusCode::CREATED, Json(Self::wrap(data))).into_response()
    }

    fn wrap(data: T) -> Self {
        Self {
            data,
            meta: ResponseMeta::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: ErrorDetail,
    pub meta: ResponseMeta,
}

impl ApiErrorResponse {
    pub fn respond(code: ErrorCode, message: impl Into<String>) -> Response {
        let body = Self {
            error: ErrorDetail {
                code,
                message: message.into(),
            },
            meta: ResponseMeta::now(),
        };
        (code.status(), Json(body)).into_response()
    }

    pub fn not_found(message: impl Into<String>) -> Response {
        Self::respond(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Response {
        Self::respond(ErrorCode::BadRequest, message)
    }

    /// Caller mistakes map to 400; a config gap is logged and maps to 500.
    pub fn from_engine(err: &EngineError) -> Response {
        let code = ErrorCode::from(err.kind());
        if code == ErrorCode::ConfigurationError {
            tracing::error!(error = %err, "Plant configuration cannot serve request");
        }
        Self::respond(code, err.to_string())
    }
}
