use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::{DbErr, models::task::TaskError};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    InvalidJson(#[from] JsonRejection),
    #[error(transparent)]
    InvalidPath(#[from] PathRejection),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_type) = match &self {
            ApiError::Task(err) => match err {
                TaskError::TaskNotFound => (StatusCode::NOT_FOUND, "TaskError"),
                TaskError::EmptyTitle => (StatusCode::BAD_REQUEST, "TaskError"),
                TaskError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "TaskError"),
            },
            ApiError::Database(db_err) => match db_err {
                DbErr::RecordNotFound(_) => (StatusCode::NOT_FOUND, "DatabaseError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "DatabaseError"),
            },
            ApiError::InvalidJson(_) => (StatusCode::BAD_REQUEST, "InvalidJson"),
            ApiError::InvalidPath(_) => (StatusCode::BAD_REQUEST, "InvalidPath"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "InternalError"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BadRequest"),
        };

        let error_message = match &self {
            ApiError::Task(TaskError::EmptyTitle) => "Title is required".to_string(),
            ApiError::Task(TaskError::TaskNotFound) => "Task not found".to_string(),
            ApiError::InvalidJson(rejection) => rejection.body_text(),
            ApiError::InvalidPath(rejection) => rejection.body_text(),
            ApiError::NotFound(msg) => msg.clone(),
            ApiError::Internal(msg) => msg.clone(),
            ApiError::BadRequest(msg) => msg.clone(),
            _ => format!("{}: {}", error_type, self),
        };

        if status_code.is_server_error() {
            tracing::error!(
                status = %status_code,
                error_type,
                error = %self,
                "API request failed"
            );
        }
        let response = ApiResponse::<()>::error(&error_message);
        (status_code, Json(response)).into_response()
    }
}
