// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Response Envelope
//!
//! Every endpoint answers with the same JSON shape:
//!
//! ```json
//! { "status": 200, "errors": null, "results": ... }
//! ```
//!
//! `status` mirrors the HTTP status code. On failure `errors` carries the
//! operation message and `results` is null, except for `Internal`, whose
//! driver detail stays in the log and is replaced with a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::domain::RegistryError;

#[derive(Debug, Serialize)]
pub struct Envelope {
    pub status: u16,
    pub errors: Option<String>,
    pub results: Value,
}

impl Envelope {
    pub fn ok(results: Value) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            errors: None,
            results,
        }
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let code = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (code, Json(self)).into_response()
    }
}

/// A workflow error on its way out as an enveloped response.
#[derive(Debug)]
pub struct ApiFailure(pub RegistryError);

impl From<RegistryError> for ApiFailure {
    fn from(err: RegistryError) -> Self {
        Self(err)
    }
}

/// HTTP status for each error variant. Client-caused failures collapse to
/// 400, credential failures to 401, and everything unexpected to 500.
pub fn status_for(err: &RegistryError) -> StatusCode {
    match err {
        RegistryError::InvalidArgument(_)
        | RegistryError::NotFound(_)
        | RegistryError::Conflict(_)
        | RegistryError::CapacityExceeded
        | RegistryError::PrerequisiteNotMet => StatusCode::BAD_REQUEST,
        RegistryError::Unauthenticated(_) | RegistryError::Forbidden(_) => {
            StatusCode::UNAUTHORIZED
        }
        RegistryError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let code = status_for(&self.0);
        let message = match &self.0 {
            RegistryError::Internal(detail) => {
                error!(%detail, "request failed");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        Envelope {
            status: code.as_u16(),
            errors: Some(message),
            results: Value::Null,
        }
        .into_response()
    }
}
