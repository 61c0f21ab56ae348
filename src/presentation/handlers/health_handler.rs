// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::domain::services::lifecycle_service::CrawlLifecycleManager;
use crate::workers::health::{HealthState, PipelineHealth};

/// 存活检查
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// 爬取引擎可用性
pub async fn engine_health(
    Extension(lifecycle): Extension<Arc<CrawlLifecycleManager>>,
) -> impl IntoResponse {
    let available = lifecycle.engine_available().await;
    let status = if available {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(json!({
            "engine": lifecycle.engine().name(),
            "available": available,
            "trackedJobs": lifecycle.registry().len(),
        })),
    )
}

/// 校验流水线健康信号
pub async fn validation_health(
    Extension(health): Extension<Arc<PipelineHealth>>,
) -> impl IntoResponse {
    let report = health.report();
    let status = match report.state {
        HealthState::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        HealthState::Healthy | HealthState::Degraded => StatusCode::OK,
    };
    (status, Json(report))
}
