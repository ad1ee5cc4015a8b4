use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::handlers::ApiResponse;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("recipient not found: {0}")]
    RecipientNotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("push provider error: {0}")]
    Provider(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<fcm_shared::FCMError> for AppError {
    fn from(err: fcm_shared::FCMError) -> Self {
        AppError::Provider(err.to_string())
    }
}

impl AppError {
    /// Label used for the invocation outcome metric
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::RecipientNotFound(_) => "recipient_not_found",
            AppError::BadRequest(_) => "bad_request",
            AppError::Provider(_) => "provider_error",
            AppError::Database(_) => "database_error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::RecipientNotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Provider(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiResponse::<()>::err(self.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::RecipientNotFound("u1".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Provider("down".to_string()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_provider_error_from_fcm() {
        let err: AppError = fcm_shared::FCMError::TokenError("timeout".to_string()).into();
        assert!(matches!(err, AppError::Provider(_)));
        assert_eq!(err.kind(), "provider_error");
    }
}
