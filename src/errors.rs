use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to save booking details, please try again")]
    StorageWrite(String),

    #[error("missing booking details, restart booking")]
    MissingService,

    #[error("select date and time")]
    MissingSchedule,

    #[error("select an address")]
    MissingAddress,

    #[error("invalid date or time: {0}")]
    InvalidSchedule(String),

    #[error("a service center id is required")]
    InvalidProvider,

    #[error("upstream service error: {0}")]
    Upstream(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::StorageWrite(ref cause) = self {
            tracing::error!(cause = %cause, "client storage write failed");
        }

        let status = match &self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::StorageWrite(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MissingService => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::MissingSchedule => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::MissingAddress => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidSchedule(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidProvider => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
