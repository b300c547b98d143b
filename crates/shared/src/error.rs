use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    NotFound,
    Conflict,
    Unavailable,
    Internal,
}

impl ErrorCode {
    /// Coarse classification from an error's display text. Conflict is
    /// checked first, then bad request, then not found.
    pub fn classify(message: &str) -> Self {
        if message.contains("409") || message.contains("Conflict") {
            ErrorCode::Conflict
        } else if message.contains("400") || message.contains("Bad Request") {
            ErrorCode::Validation
        } else if message.contains("404") || message.contains("Not Found") {
            ErrorCode::NotFound
        } else {
            ErrorCode::Internal
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("{code:?}: {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// User-facing failure for a backend mutation, worded by the
    /// classification of `detail`.
    pub fn operation_failed(detail: &str) -> Self {
        let code = ErrorCode::classify(detail);
        let message = match code {
            ErrorCode::Conflict => "操作失败：资源冲突（名称可能已存在）".to_string(),
            ErrorCode::Validation => "操作失败：请求参数无效".to_string(),
            ErrorCode::NotFound => "操作失败：资源未找到".to_string(),
            ErrorCode::Unavailable | ErrorCode::Internal => format!("操作失败：{detail}"),
        };
        Self { code, message }
    }
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
