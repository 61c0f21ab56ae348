// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::{
    application::{
        dto::document_request::{OfficeFileDto, ValidationTaskDto},
        use_cases::document_use_case::DocumentUseCase,
    },
    domain::models::office_document::OfficeDocumentKind,
    presentation::errors::AppError,
};

/// 提交PDF校验任务
pub async fn submit_validation(
    Extension(documents): Extension<Arc<DocumentUseCase>>,
    Json(payload): Json<ValidationTaskDto>,
) -> Result<impl IntoResponse, AppError> {
    let depth = documents.submit_validation(payload).await?;
    Ok((StatusCode::ACCEPTED, Json(json!({ "queueSize": depth }))))
}

/// 查询校验队列长度
pub async fn queue_size(
    Extension(documents): Extension<Arc<DocumentUseCase>>,
) -> impl IntoResponse {
    Json(json!({ "queueSize": documents.queue_depth().await }))
}

/// 提交 Microsoft Office 文档元数据
pub async fn submit_microsoft_office(
    Extension(documents): Extension<Arc<DocumentUseCase>>,
    Json(payload): Json<OfficeFileDto>,
) -> Result<impl IntoResponse, AppError> {
    documents
        .submit_office_document(payload, OfficeDocumentKind::MicrosoftOffice)
        .await?;
    Ok(StatusCode::CREATED)
}

/// 提交 ODF 文档元数据
pub async fn submit_odf(
    Extension(documents): Extension<Arc<DocumentUseCase>>,
    Json(payload): Json<OfficeFileDto>,
) -> Result<impl IntoResponse, AppError> {
    documents
        .submit_office_document(payload, OfficeDocumentKind::Odf)
        .await?;
    Ok(StatusCode::CREATED)
}
