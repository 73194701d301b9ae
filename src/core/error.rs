//! 核心错误处理模块

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::app::product::{service::ProductError, validation::describe};

/// 核心错误类型
#[derive(Debug)]
pub enum CoreError {
    /// 请求无法解析（非数字 ID、畸形 JSON 等）
    BadRequest(String),
    Validation { field: String, message: String },
    NotFound(String),
    InternalServerError(String),
}

/// 错误响应结构
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub code: u16,
    pub timestamp: String,
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let (status, error_message, user_message, field) = match self {
            CoreError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            CoreError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILED",
                message,
                Some(field),
            ),
            CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            CoreError::InternalServerError(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let error_response = ErrorResponse {
            error: error_message.to_string(),
            message: user_message,
            field,
            code: status.as_u16(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, axum::Json(error_response)).into_response()
    }
}

impl From<ProductError> for CoreError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::Validation(errors) => {
                let (field, message) = describe(&errors)
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| ("product".to_string(), "Validation error".to_string()));
                CoreError::Validation { field, message }
            }
            ProductError::NotFound(id) => CoreError::NotFound(format!("Product {} not found", id)),
            ProductError::Store(err) => CoreError::InternalServerError(err.to_string()),
        }
    }
}

impl From<JsonRejection> for CoreError {
    fn from(rejection: JsonRejection) -> Self {
        CoreError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for CoreError {
    fn from(rejection: PathRejection) -> Self {
        CoreError::BadRequest(rejection.body_text())
    }
}
