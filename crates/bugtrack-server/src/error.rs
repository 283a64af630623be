//! Conversion of failures into the JSON error payload.

use axum::Json;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use bugtrack_core::FieldErrors;
use bugtrack_core::GatewayError;
use bugtrack_core::error::ErrorCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub message: String,
    pub status_code: u16,
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<FieldErrors>,
}

/// A request failure ready to be rendered.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    details: Option<FieldErrors>,
    request_id: Option<String>,
    log_detail: String,
}

impl ApiError {
    #[must_use]
    pub fn from_gateway(err: GatewayError, headers: &HeaderMap) -> Self {
        Self {
            code: err.code(),
            message: err.public_message(),
            log_detail: match &err {
                GatewayError::Internal(detail) => detail.clone(),
                other => other.to_string(),
            },
            details: err.details().cloned(),
            request_id: request_id(headers),
        }
    }

    #[must_use]
    pub fn route_not_found(path: &str, headers: &HeaderMap) -> Self {
        let message = format!("Route {path} not found");
        Self {
            code: ErrorCode::RouteNotFound,
            log_detail: message.clone(),
            message,
            details: None,
            request_id: request_id(headers),
        }
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    #[must_use]
    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            message: self.message.clone(),
            status_code: self.code.http_status(),
            request_id: self.request_id.clone(),
            details: self.details.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(
                code = %self.code,
                status = status.as_u16(),
                request_id = self.request_id.as_deref().unwrap_or("-"),
                detail = %self.log_detail,
                "request failed"
            );
        } else {
            debug!(
                code = %self.code,
                status = status.as_u16(),
                detail = %self.log_detail,
                "request rejected"
            );
        }

        (status, Json(self.payload())).into_response()
    }
}

/// The caller-supplied request id, if any.
#[must_use]
pub fn request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}
