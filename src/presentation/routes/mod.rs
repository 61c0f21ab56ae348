// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::use_cases::document_use_case::DocumentUseCase;
use crate::domain::services::batch_service::BatchService;
use crate::domain::services::lifecycle_service::CrawlLifecycleManager;
use crate::presentation::handlers::{
    batch_handler, document_handler, health_handler, job_handler,
};
use crate::workers::health::PipelineHealth;
use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// 控制接口依赖的服务
#[derive(Clone)]
pub struct ApiServices {
    pub lifecycle: Arc<CrawlLifecycleManager>,
    pub batches: Arc<BatchService>,
    pub documents: Arc<DocumentUseCase>,
    pub health: Arc<PipelineHealth>,
}

/// 创建应用路由
///
/// # 返回值
///
/// 返回未注入服务的路由
pub fn routes() -> Router {
    let health_routes = Router::new()
        .route("/health", get(health_handler::health_check))
        .route("/health/engine", get(health_handler::engine_health))
        .route("/health/validation", get(health_handler::validation_health));

    let job_routes = Router::new()
        .route("/api/crawl-jobs", post(job_handler::start_job))
        .route(
            "/api/crawl-jobs/{id}",
            get(job_handler::get_job).delete(job_handler::delete_job),
        )
        .route("/api/crawl-jobs/{id}/pause", post(job_handler::pause_job))
        .route(
            "/api/crawl-jobs/{id}/unpause",
            post(job_handler::unpause_job),
        )
        .route(
            "/api/crawl-jobs/{id}/terminate",
            post(job_handler::terminate_job),
        )
        .route(
            "/api/crawl-jobs/{id}/restart",
            post(job_handler::restart_job),
        )
        .route("/api/email", post(job_handler::set_report_email))
        .route("/api/batch", post(batch_handler::start_batch))
        .route("/api/batch/{id}", get(batch_handler::get_batch));

    let document_routes = Router::new()
        .route("/api/validation", post(document_handler::submit_validation))
        .route("/api/validation/queue", get(document_handler::queue_size))
        .route(
            "/api/microsoft_office",
            post(document_handler::submit_microsoft_office),
        )
        .route("/api/odf", post(document_handler::submit_odf));

    Router::new()
        .merge(health_routes)
        .merge(job_routes)
        .merge(document_routes)
}

/// 创建注入了服务与请求追踪的完整应用
pub fn app(services: ApiServices) -> Router {
    routes()
        .layer(Extension(services.lifecycle))
        .layer(Extension(services.batches))
        .layer(Extension(services.documents))
        .layer(Extension(services.health))
        .layer(TraceLayer::new_for_http())
}
