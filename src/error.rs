//! 统一错误模型
//! 定义所有错误类型和错误响应格式

use crate::models::response::ApiResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Token is missing")]
    MissingToken,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token is invalid")]
    InvalidToken,

    #[error("Token has expired")]
    Expired,

    #[error("Session has been revoked")]
    SessionRevoked,

    #[error("User not found")]
    UserNotFound,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Invalid route")]
    RouteNotFound,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::MissingToken | AppError::Unauthenticated | AppError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AppError::InvalidToken | AppError::Expired | AppError::SessionRevoked => {
                StatusCode::FORBIDDEN
            }
            AppError::UserNotFound | AppError::RouteNotFound => StatusCode::NOT_FOUND,
            AppError::UsernameTaken => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 获取用户友好的错误消息（不包含敏感信息）
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::MissingToken => "Token is missing".to_string(),
            AppError::Unauthenticated => "Authentication required".to_string(),
            AppError::InvalidCredentials => "Invalid password".to_string(),
            AppError::InvalidToken => "Token is invalid".to_string(),
            AppError::Expired => "Token has expired".to_string(),
            AppError::SessionRevoked => "Session is no longer active".to_string(),
            AppError::UserNotFound => "User not found".to_string(),
            AppError::UsernameTaken => "Username already exists".to_string(),
            AppError::RouteNotFound => "Invalid route".to_string(),
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }

    /// 获取错误码
    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "Request failed");
        } else {
            tracing::debug!(code = self.code(), error = %self, "Request rejected");
        }

        let body = if status.is_server_error() {
            ApiResponse::<()>::error(self.user_message())
        } else {
            ApiResponse::<()>::failure(self.user_message())
        };

        (status, Json(body)).into_response()
    }
}

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

/// 从阻塞任务失败转换
impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("Blocking task failed: {}", e))
    }
}
