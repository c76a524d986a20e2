use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Body of every error response: `{"error": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Client sent something we refuse to pass to the store.
    #[error("{0}")]
    Validation(&'static str),
    #[error("request body too large")]
    PayloadTooLarge,
    #[error("settings not found")]
    NotFound,
    /// Anything that went wrong talking to the store. The detail is logged,
    /// never returned.
    #[error("storage failure")]
    Storage(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Validation(reason) => {
                warn!(%reason, "request rejected");
                (*reason).to_string()
            }
            ApiError::PayloadTooLarge => {
                warn!("request body over the size limit");
                self.to_string()
            }
            ApiError::NotFound => self.to_string(),
            ApiError::Storage(e) => {
                error!(error = ?e, "storage failure");
                "internal server error".to_string()
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
