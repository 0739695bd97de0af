use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    UnprocessableEntity(String),
    #[error("{0}")]
    EntityNotFound(String),
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),
    #[error("already registered: {0}")]
    AlreadyRegistered(String),
    #[error("not registered: {0}")]
    NotRegistered(String),
    #[error("registration conflict: {0}")]
    RegistrationConflict(String),
    #[error("{0}")]
    ValidationError(#[from] garde::Report),
    #[error("failed to run the transaction")]
    TransactionError(#[source] sqlx::Error),
    #[error("failed to run a database operation")]
    SpecificOperationError(#[source] sqlx::Error),
    #[error("no rows affected: {0}")]
    NoRowsAffectedError(String),
    #[error("{0}")]
    KeyValueStoreError(#[from] redis::RedisError),
    #[error("{0}")]
    BcryptError(#[from] bcrypt::BcryptError),
    #[error("{0}")]
    ConvertToUuidError(#[from] uuid::Error),
    #[error("authentication failed")]
    UnauthenticatedError,
    #[error("missing or invalid authorization token")]
    UnauthorizedError,
    #[error("this operation is not permitted for your role")]
    ForbiddenOperation,
    #[error("{0}")]
    ConversionEntityError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status_code = match self {
            AppError::UnprocessableEntity(_)
            | AppError::CapacityExceeded(_)
            | AppError::AlreadyRegistered(_)
            | AppError::NotRegistered(_)
            | AppError::ValidationError(_)
            | AppError::ConvertToUuidError(_) => StatusCode::BAD_REQUEST,
            AppError::EntityNotFound(_) => StatusCode::NOT_FOUND,
            AppError::RegistrationConflict(_) => StatusCode::CONFLICT,
            AppError::UnauthenticatedError | AppError::UnauthorizedError => {
                StatusCode::UNAUTHORIZED
            }
            AppError::ForbiddenOperation => StatusCode::FORBIDDEN,
            AppError::TransactionError(_)
            | AppError::SpecificOperationError(_)
            | AppError::NoRowsAffectedError(_)
            | AppError::KeyValueStoreError(_)
            | AppError::BcryptError(_)
            | AppError::ConversionEntityError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status_code.is_server_error() {
            tracing::error!(
                error.cause_chain = ?self,
                error.message = %self,
                "unexpected error happened"
            );
        }

        (status_code, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
