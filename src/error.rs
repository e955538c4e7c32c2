//! Error types shared by the middleware, the classifiers and the routes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Failure talking to the identity provider. Distinct from "no session".
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("identity provider answered {status}: {message}")]
    Unavailable { status: u16, message: String },
    #[error("identity provider returned an unreadable session: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Failure talking to the hosted data API on behalf of a request.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("data api request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("data api answered {status}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, thiserror::Error)]
#[error("{} invalid field(s)", .0.len())]
#[serde(transparent)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn push(&mut self, field: &'static str, reason: impl Into<String>) {
        self.0.push(ValidationError::new(field, reason));
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(err: ValidationError) -> Self {
        ValidationErrors(vec![err])
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("not signed in")]
    Unauthorized,
    #[error("not found")]
    NotFound,
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Provider(err) => {
                tracing::error!("Error resolving session: {err}");
                StatusCode::BAD_GATEWAY.into_response()
            }
            ApiError::Upstream(UpstreamError::Status { status, body }) => {
                tracing::warn!("Data api rejected request with {status}: {body}");
                StatusCode::from_u16(status)
                    .ok()
                    .filter(|status| status.is_client_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY)
                    .into_response()
            }
            ApiError::Upstream(err) => {
                tracing::error!("Error reaching data api: {err}");
                StatusCode::BAD_GATEWAY.into_response()
            }
            ApiError::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
        }
    }
}
