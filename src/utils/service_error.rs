// Service error taxonomy shared by every handler
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Version conflict on {0}")]
    VersionConflict(&'static str),

    #[error("{provider} request failed: {detail}")]
    UpstreamError { provider: &'static str, detail: String },

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Internal server error")]
    InternalError,
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            // A CAS loop that never settles reads as a server-side failure
            ServiceError::VersionConflict(_)
            | ServiceError::UpstreamError { .. }
            | ServiceError::StoreError(_)
            | ServiceError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn upstream(provider: &'static str, detail: impl Into<String>) -> Self {
        ServiceError::UpstreamError {
            provider,
            detail: detail.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::ValidationError(msg.into())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            ServiceError::UpstreamError { provider, detail } => Json(json!({
                "error": self.to_string(),
                "status": status.as_u16(),
                "details": { "provider": provider, "response": detail }
            })),
            _ => Json(json!({
                "error": self.to_string(),
                "status": status.as_u16()
            })),
        };

        (status, body).into_response()
    }
}

impl From<crate::store::StoreError> for ServiceError {
    fn from(error: crate::store::StoreError) -> Self {
        match error {
            crate::store::StoreError::NotFound { collection, .. } => {
                ServiceError::NotFound(collection)
            },
            crate::store::StoreError::VersionConflict { collection, .. } => {
                ServiceError::VersionConflict(collection)
            },
            crate::store::StoreError::Serialization(msg) => ServiceError::StoreError(msg),
            crate::store::StoreError::Backend(msg) => ServiceError::StoreError(msg),
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors
                    .iter()
                    .map(move |e| format!("{}: {}", field, e.message.as_ref().unwrap_or(&e.code)))
            })
            .collect();

        ServiceError::ValidationError(messages.join(", "))
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::StoreError(format!("Malformed document: {}", err))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
