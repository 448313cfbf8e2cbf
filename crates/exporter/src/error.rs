// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Why an export request produced no result set.
///
/// Per-namespace failures are not errors here; they travel inside the
/// result set.
#[derive(Debug)]
pub enum ExportError {
    /// The namespace listing itself failed.
    Namespaces(anyhow::Error),
    /// The request deadline passed before the join completed.
    Timeout(Duration),
    ShuttingDown,
    Encode(serde_json::Error),
}

impl ExportError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Namespaces(_) => StatusCode::BAD_GATEWAY,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
            Self::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Namespaces(_) => "UPSTREAM_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::ShuttingDown => "SHUTTING_DOWN",
            Self::Encode(_) => "INTERNAL",
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Namespaces(e) => write!(f, "failed to list namespaces: {e:#}"),
            Self::Timeout(limit) => {
                write!(f, "export did not finish within {}ms", limit.as_millis())
            }
            Self::ShuttingDown => f.write_str("server is shutting down"),
            Self::Encode(e) => write!(f, "encode failed: {e}"),
        }
    }
}

impl std::error::Error for ExportError {}

impl IntoResponse for ExportError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody { code: self.code().to_owned(), message: self.to_string() },
        };
        (self.status(), Json(body)).into_response()
    }
}

/// `{"error": {"code": ..., "message": ...}}`
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}
