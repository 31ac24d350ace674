//! HTTP-facing error taxonomy.
//!
//! Every failure a handler can produce ends up as an [`ApiError`], which maps to
//! a stable status code and a machine-readable `{"error": ...}` body.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Machine-readable error body shared by every endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Stable error code (e.g. `invalid_client`, `invalid_scope`, `conflict`)
    pub error: String,
    /// Human-readable detail, omitted where it could leak information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("registration credential rejected")]
    Forbidden,
    /// Unknown client, inactive client or wrong secret. Deliberately one variant.
    #[error("client authentication failed")]
    InvalidClient,
    #[error("requested scope exceeds the granted set")]
    InvalidScope,
    #[error("unknown scope(s): {}", .0.join(", "))]
    UnknownScope(Vec<String>),
    #[error("A {resource} with that {field} already exists.")]
    Conflict {
        resource: &'static str,
        field: String,
    },
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    InvalidToken(String),
    #[error("Rate limit exceeded, retry in {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        ApiError::Internal(detail.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::InvalidClient | ApiError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            ApiError::InvalidScope | ApiError::UnknownScope(_) | ApiError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The stable `error` code of the response body.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Forbidden => "forbidden",
            ApiError::InvalidClient => "invalid_client",
            ApiError::InvalidScope | ApiError::UnknownScope(_) => "invalid_scope",
            ApiError::Conflict { .. } => "conflict",
            ApiError::Validation(_) => "validation_error",
            ApiError::InvalidToken(_) => "invalid_token",
            ApiError::RateLimited { .. } => "rate_limited",
            ApiError::Internal(_) => "server_error",
        }
    }

    fn body(&self) -> ErrorResponse {
        let message = match self {
            ApiError::Forbidden
            | ApiError::InvalidClient
            | ApiError::InvalidScope
            | ApiError::Internal(_) => None,
            other => Some(other.to_string()),
        };
        ErrorResponse {
            error: self.code().to_string(),
            message,
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(crate::validation::describe(&err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!(error = %detail, "request failed with an internal error");
        }

        let mut response = (self.status(), Json(self.body())).into_response();
        let challenge = match self {
            ApiError::InvalidClient => Some(r#"Bearer realm="oauth""#),
            ApiError::InvalidToken(_) => Some(r#"Bearer error="invalid_token""#),
            _ => None,
        };
        if let Some(challenge) = challenge {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(challenge),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::InvalidClient.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidScope.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::UnknownScope(vec!["x".into()]).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict {
                resource: "user",
                field: "email".into()
            }
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InvalidToken("expired".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::RateLimited {
                retry_after_secs: 5
            }
            .status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::internal("boom").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invalid_client_carries_challenge() {
        let response = ApiError::InvalidClient.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            r#"Bearer realm="oauth""#
        );
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let body = ApiError::internal("connection refused on 10.0.0.5").body();
        assert_eq!(body.error, "server_error");
        assert!(body.message.is_none());
    }

    #[test]
    fn test_conflict_message() {
        let err = ApiError::Conflict {
            resource: "user",
            field: "email".into(),
        };
        assert_eq!(
            err.body().message.as_deref(),
            Some("A user with that email already exists.")
        );
    }
}
