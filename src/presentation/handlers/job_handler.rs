// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    application::dto::crawl_request::{EmailAddressDto, StartJobRequestDto},
    domain::services::lifecycle_service::{CrawlLifecycleManager, JobReport, TransitionResult},
    presentation::errors::AppError,
};

/// 状态迁移响应
#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    /// 迁移是否生效
    pub applied: bool,
    /// 操作后的任务报告
    pub job: JobReport,
}

fn transition_response(id: Uuid, result: TransitionResult) -> Result<impl IntoResponse, AppError> {
    let applied = result.is_applied();
    match result {
        TransitionResult::Applied(job) | TransitionResult::Unchanged(job) => {
            Ok((StatusCode::OK, Json(TransitionResponse { applied, job })))
        }
        TransitionResult::NotFound => Err(AppError::not_found(format!(
            "Crawl job {} is not tracked",
            id
        ))),
    }
}

/// 启动爬取任务
///
/// 引擎失败时返回状态为 `UNBUILT` 的报告，而不是错误
pub async fn start_job(
    Extension(lifecycle): Extension<Arc<CrawlLifecycleManager>>,
    Json(payload): Json<StartJobRequestDto>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::bad_request(e.to_string()))?;
    let request = payload.into_request().map_err(AppError::bad_request)?;

    let report = lifecycle.start(request).await;
    Ok((StatusCode::OK, Json(report)))
}

/// 获取爬取任务报告
pub async fn get_job(
    Extension(lifecycle): Extension<Arc<CrawlLifecycleManager>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    match lifecycle.get_job(id).await {
        Some(report) => Ok((StatusCode::OK, Json(report))),
        None => Err(AppError::not_found(format!("Crawl job {} not found", id))),
    }
}

/// 暂停爬取任务
pub async fn pause_job(
    Extension(lifecycle): Extension<Arc<CrawlLifecycleManager>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    transition_response(id, lifecycle.pause(id).await)
}

/// 恢复爬取任务
pub async fn unpause_job(
    Extension(lifecycle): Extension<Arc<CrawlLifecycleManager>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    transition_response(id, lifecycle.unpause(id).await)
}

/// 终止爬取任务
pub async fn terminate_job(
    Extension(lifecycle): Extension<Arc<CrawlLifecycleManager>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    transition_response(id, lifecycle.terminate(id).await)
}

/// 重启爬取任务
pub async fn restart_job(
    Extension(lifecycle): Extension<Arc<CrawlLifecycleManager>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    transition_response(id, lifecycle.restart(id).await)
}

/// 删除爬取任务
pub async fn delete_job(
    Extension(lifecycle): Extension<Arc<CrawlLifecycleManager>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    transition_response(id, lifecycle.delete(id).await)
}

/// 设置通知收件人
pub async fn set_report_email(
    Extension(lifecycle): Extension<Arc<CrawlLifecycleManager>>,
    Json(payload): Json<EmailAddressDto>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::bad_request(e.to_string()))?;
    let result = lifecycle
        .set_report_email(payload.job, payload.email_address)
        .await;
    transition_response(payload.job, result)
}
