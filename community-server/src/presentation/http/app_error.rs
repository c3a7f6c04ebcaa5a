use std::collections::BTreeMap;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::domain::error::DomainError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("unauthorized")]
    Unauthorized,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("payload too large")]
    PayloadTooLarge,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge;
        }
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

pub(crate) type AppResult<T> = Result<T, AppError>;

/// Flat error payload. `fields` is only present for input validation
/// failures and maps a field name to its messages.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ErrorBody {
    pub(crate) error: String,
    pub(crate) message: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) fields: BTreeMap<String, Vec<String>>,
}

impl ErrorBody {
    pub(crate) fn new(error: &'static str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }
}

pub(crate) fn error_response(status: StatusCode, body: ErrorBody) -> Response {
    (status, Json(body)).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Domain(err) => match &err {
                DomainError::Validation { field, message } => {
                    let mut body = ErrorBody::new("invalid_input", err.to_string());
                    body.fields
                        .insert((*field).to_string(), vec![(*message).to_string()]);
                    (StatusCode::BAD_REQUEST, body)
                }
                DomainError::Conflict(_) => {
                    (StatusCode::CONFLICT, ErrorBody::new("conflict", err.to_string()))
                }
                DomainError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    ErrorBody::new("invalid_credentials", "invalid username or password"),
                ),
                DomainError::NotFound { .. } => {
                    (StatusCode::NOT_FOUND, ErrorBody::new("not_found", err.to_string()))
                }
                DomainError::Forbidden => (
                    StatusCode::FORBIDDEN,
                    ErrorBody::new("forbidden", "access denied"),
                ),
                DomainError::Unexpected(detail) => {
                    error!(error = %detail, "unexpected domain error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorBody::new("internal", "internal error"),
                    )
                }
            },
            AppError::Validation(errors) => {
                let mut body = ErrorBody::new("invalid_input", "request validation failed");
                body.fields = validation_fields(&errors);
                (StatusCode::BAD_REQUEST, body)
            }
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorBody::new("unauthorized", "authentication required"),
            ),
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, ErrorBody::new("invalid_input", message))
            }
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorBody::new("payload_too_large", "request body is too large"),
            ),
        };

        error_response(status, body)
    }
}

fn validation_fields(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|err| match &err.message {
                    Some(message) => message.to_string(),
                    None => err.code.to_string(),
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};
    use serde_json::Value;

    use super::AppError;
    use crate::domain::error::DomainError;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body must be readable");
        let json = serde_json::from_slice(&bytes).expect("body must be json");
        (status, json)
    }

    #[tokio::test]
    async fn domain_errors_map_to_tags_and_statuses() {
        let cases = [
            (
                AppError::from(DomainError::not_found("post", 3)),
                StatusCode::NOT_FOUND,
                "not_found",
            ),
            (
                AppError::from(DomainError::Conflict("username")),
                StatusCode::CONFLICT,
                "conflict",
            ),
            (
                AppError::from(DomainError::Forbidden),
                StatusCode::FORBIDDEN,
                "forbidden",
            ),
            (
                AppError::from(DomainError::InvalidCredentials),
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
            ),
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED, "unauthorized"),
            (
                AppError::BadRequest("missing field `title`".to_string()),
                StatusCode::BAD_REQUEST,
                "invalid_input",
            ),
            (
                AppError::PayloadTooLarge,
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
            ),
        ];

        for (err, status, tag) in cases {
            let (got_status, body) = render(err).await;
            assert_eq!(got_status, status);
            assert_eq!(body["error"], tag);
            assert!(body["message"].is_string());
            assert!(body.get("fields").is_none());
        }
    }

    #[tokio::test]
    async fn validation_error_lists_offending_field() {
        let (status, body) = render(AppError::from(DomainError::Validation {
            field: "title",
            message: "must be 1..200 chars",
        }))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_input");
        assert_eq!(body["fields"]["title"][0], "must be 1..200 chars");
    }

    #[tokio::test]
    async fn unexpected_error_does_not_leak_details() {
        let (status, body) = render(AppError::from(DomainError::Unexpected(
            "connection refused at 10.0.0.3".to_string(),
        )))
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal");
        assert_eq!(body["message"], "internal error");
    }
}
