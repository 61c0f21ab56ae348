// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    application::dto::{batch_request::StartBatchRequestDto, crawl_request::parse_scheduled_date},
    domain::services::batch_service::BatchService,
    presentation::errors::AppError,
};

/// 启动批量任务
pub async fn start_batch(
    Extension(batches): Extension<Arc<BatchService>>,
    Json(payload): Json<StartBatchRequestDto>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::bad_request(e.to_string()))?;
    let date = parse_scheduled_date(payload.date.as_deref()).map_err(AppError::bad_request)?;

    let report = batches
        .start_batch(&payload.domains, payload.report_email, date)
        .await;
    Ok((StatusCode::CREATED, Json(report)))
}

/// 获取批量任务报告
pub async fn get_batch(
    Extension(batches): Extension<Arc<BatchService>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    batches
        .get_batch(id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Batch job {} not found", id)))
}
