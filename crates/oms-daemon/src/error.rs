//! Error taxonomy for the order API.
//!
//! Three failure classes, surfaced distinctly to the caller:
//!   - validation (400): malformed or missing input, rejected before any
//!     database work, with the failing field named in the body;
//!   - not-found (404): the referenced order id matches no row;
//!   - internal (500): database unreachable or constraint violation; the
//!     body is a generic message and the cause is logged for operators.
//!
//! No failure is fatal to the process; every error is scoped to its request.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed on field `{field}`: {message}")]
    Validation { field: &'static str, message: String },

    #[error("order not found")]
    NotFound,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ApiError::Validation { field, message: message.into() }
    }
}

/// Wire shape of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    /// Set only for validation failures: the input field that failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: message,
                    field: Some(field.to_string()),
                }),
            )
                .into_response(),

            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorBody {
                    error: "order not found".to_string(),
                    field: None,
                }),
            )
                .into_response(),

            ApiError::Internal(err) => {
                // Operator-visible cause; the caller only gets a generic body.
                tracing::error!(error = ?err, "internal error handling order request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        error: "internal error".to_string(),
                        field: None,
                    }),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_names_the_field() {
        let err = ApiError::validation("customerName", "must not be empty");
        match err {
            ApiError::Validation { field, .. } => assert_eq!(field, "customerName"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn error_body_omits_field_when_absent() {
        let body = ErrorBody { error: "order not found".to_string(), field: None };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("field").is_none());
        assert_eq!(json["error"], "order not found");
    }
}
