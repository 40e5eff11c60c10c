use aide::OperationOutput;
use axum::extract::rejection::JsonRejection;
use axum::{http::StatusCode, response::IntoResponse, Json};
use schemars::JsonSchema;
use serde_json::json;

/// Represent errors in the application
///
/// All `ServiceError`s can be transformed to http errors.
#[derive(Debug, Clone, PartialEq, JsonSchema)]
pub enum ServiceError {
    BadRequest(String),
    InternalServerError(String),
    NotFound,
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::BadRequest(cause) => write!(f, "Bad request: {cause}"),
            ServiceError::InternalServerError(cause) => write!(f, "Internal server error: {cause}"),
            ServiceError::NotFound => write!(f, "Not found"),
        }
    }
}

impl std::error::Error for ServiceError {}

/// Helper for `ServiceError` result
pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<sqlx::Error> for ServiceError {
    fn from(error: sqlx::Error) -> Self {
        // Pass the message of the database server through unchanged.
        match error.as_database_error() {
            Some(database_error) => {
                ServiceError::InternalServerError(database_error.message().to_owned())
            }
            None => ServiceError::InternalServerError(error.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for ServiceError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        ServiceError::InternalServerError(error.to_string())
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(error: std::io::Error) -> Self {
        ServiceError::InternalServerError(error.to_string())
    }
}

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        ServiceError::BadRequest(rejection.body_text())
    }
}

impl OperationOutput for ServiceError {
    type Inner = String;
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ServiceError::BadRequest(cause) => {
                log::debug!("Rejected request: {}", cause);
                (StatusCode::BAD_REQUEST, Json(json!({ "error": cause })))
            }
            ServiceError::InternalServerError(cause) => {
                log::error!("Request failed: {}", cause);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": cause })),
                )
            }
            ServiceError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "Not found",
                })),
            ),
        }
        .into_response()
    }
}
