use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("password hashing error: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
    #[error("token signing error: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("invalid email or password")]
    LoginFail,
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("recipient {0} does not exist")]
    RecipientNotFound(String),
    #[error("insufficient funds: your current balance is {balance}")]
    InsufficientFunds { balance: i64 },
    #[error("invalid request body: {0}")]
    Body(String),
    #[error("Method: {method} not allowed on {path}")]
    MethodNotAllowed { method: String, path: String },
}

impl AppError {
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        AppError::Unauthorized(reason.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Body(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Body(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error_message) = match &self {
            AppError::Sqlx(e) => {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_unique_violation() {
                        return envelope(
                            StatusCode::CONFLICT,
                            "email_taken",
                            "Email already exists".to_string(),
                            None,
                        );
                    }
                }
                tracing::error!("storage failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage_error",
                    "Database error".to_string(),
                )
            }
            AppError::PasswordHash(e) => {
                tracing::error!("password hashing failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Password hashing error".to_string(),
                )
            }
            AppError::Signing(e) => {
                tracing::error!("token signing failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "signing_error",
                    "Token error".to_string(),
                )
            }
            AppError::LoginFail => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Invalid email or password".to_string(),
            ),
            AppError::Unauthorized(reason) => {
                tracing::warn!("rejected request: {}", reason);
                (
                    StatusCode::UNAUTHORIZED,
                    "unauthorized",
                    "Unauthorized".to_string(),
                )
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            AppError::Body(msg) => (StatusCode::BAD_REQUEST, "invalid_body", msg.clone()),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::MethodNotAllowed { .. } => (
                StatusCode::METHOD_NOT_ALLOWED,
                "method_not_allowed",
                self.to_string(),
            ),
            AppError::RecipientNotFound(_) => (
                StatusCode::NOT_FOUND,
                "recipient_not_found",
                "The account you are trying to transfer money to does not exist".to_string(),
            ),
            AppError::InsufficientFunds { balance } => {
                return envelope(
                    StatusCode::BAD_REQUEST,
                    "insufficient_funds",
                    self.to_string(),
                    Some(*balance),
                );
            }
        };

        envelope(status, code, error_message, None)
    }
}

fn envelope(
    status: StatusCode,
    code: &'static str,
    error_message: String,
    balance: Option<i64>,
) -> Response {
    let mut body = json!({
        "error": error_message,
        "code": code,
    });
    if let Some(balance) = balance {
        body["balance"] = json!(balance);
    }

    (status, Json(body)).into_response()
}
