// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::application::use_cases::document_use_case::DocumentUseCaseError;
use crate::domain::repositories::RepositoryError;
use crate::queue::validation_queue::QueueError;

/// 应用错误类型
///
/// 封装所有可能的应用层错误，提供统一的错误处理接口
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    /// 请求内容无效
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: anyhow::anyhow!(message.into()),
        }
    }

    /// 资源不存在
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: anyhow::anyhow!(message.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// 根据错误类型确定状态码
///
/// 队列持久化失败意味着持久化保证被破坏，总是返回500
fn classify(error: &anyhow::Error) -> StatusCode {
    if let Some(e) = error.downcast_ref::<DocumentUseCaseError>() {
        return match e {
            DocumentUseCaseError::ValidationError(_) => StatusCode::BAD_REQUEST,
            DocumentUseCaseError::UnknownJob(_) => StatusCode::NOT_FOUND,
            DocumentUseCaseError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            DocumentUseCaseError::Queue(_) | DocumentUseCaseError::Repository(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
    }
    if error.downcast_ref::<QueueError>().is_some() {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    match error.downcast_ref::<RepositoryError>() {
        Some(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.error.to_string() }));
        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let error = err.into();
        Self {
            status: classify(&error),
            error,
        }
    }
}
