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
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use vericrawl::application::use_cases::document_use_case::DocumentUseCase;
use vericrawl::config::settings::Settings;
use vericrawl::domain::services::batch_service::BatchService;
use vericrawl::domain::services::job_registry::JobRegistry;
use vericrawl::domain::services::lifecycle_service::CrawlLifecycleManager;
use vericrawl::domain::services::validation_protocol::{ProtocolConfig, ValidationProtocol};
use vericrawl::engines::heritrix_engine::HeritrixEngine;
use vericrawl::infrastructure::database::connection;
use vericrawl::infrastructure::repositories::crawl_job_repo_impl::CrawlJobRepositoryImpl;
use vericrawl::infrastructure::repositories::office_document_repo_impl::OfficeDocumentRepositoryImpl;
use vericrawl::infrastructure::repositories::validated_document_repo_impl::ValidatedDocumentRepositoryImpl;
use vericrawl::infrastructure::services::notifier_impl::build_notifier;
use vericrawl::infrastructure::storage::LocalReportStorage;
use vericrawl::infrastructure::validation::verapdf_client::VeraPdfServiceClient;
use vericrawl::presentation::routes::{self, ApiServices};
use vericrawl::queue::validation_queue::ValidationQueue;
use vericrawl::utils::retry_policy::RetryPolicy;
use vericrawl::utils::telemetry;
use vericrawl::workers::health::PipelineHealth;
use vericrawl::workers::manager::WorkerManager;
use vericrawl::workers::validation_worker::ValidationWorker;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting vericrawl...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    vericrawl::infrastructure::metrics::init_metrics(&settings.metrics.listen_address);

    // 3. Connect to database and apply migrations
    let db = Arc::new(connection::connect_and_migrate(&settings.database).await?);

    // 4. Collaborators
    let template = match &settings.heritrix.config_template_path {
        Some(path) => Some(tokio::fs::read_to_string(path).await?),
        None => None,
    };
    let engine = Arc::new(HeritrixEngine::new(&settings.heritrix, template)?);
    let notifier = build_notifier(&settings.notification)?;
    let crawl_jobs = Arc::new(CrawlJobRepositoryImpl::new(db.clone()));
    let documents = Arc::new(ValidatedDocumentRepositoryImpl::new(db.clone()));
    let office_documents = Arc::new(OfficeDocumentRepositoryImpl::new(db.clone()));

    // 5. Restore tracked jobs before reloading the queue so tasks resolve their owner
    let registry = Arc::new(JobRegistry::new());
    let lifecycle = Arc::new(CrawlLifecycleManager::new(
        registry.clone(),
        engine,
        crawl_jobs,
        notifier,
        settings.server.public_url.clone(),
    ));
    let restored = lifecycle.restore_from_repository().await?;
    info!("Restored {} tracked crawl jobs", restored);

    let queue = Arc::new(ValidationQueue::load(&settings.validation.snapshot_path, &registry).await?);
    info!("Validation queue loaded with {} pending tasks", queue.len().await);

    // 6. Start the validation worker
    let validation = &settings.validation;
    let client = VeraPdfServiceClient::new(validation.service_url.clone(), Duration::from_secs(60))?;
    let protocol = ValidationProtocol::new(
        Arc::new(client),
        ProtocolConfig {
            max_polls: validation.max_polls,
            poll_interval: Duration::from_secs(validation.poll_interval_secs),
            max_retries: validation.max_retries,
        },
    );
    let retry_policy = RetryPolicy::transport(
        Duration::from_secs(validation.transport_retry_secs),
        validation.transport_max_attempts,
    );
    if retry_policy.is_unbounded() {
        warn!("Validation service transport retries are unbounded");
    }
    let health = Arc::new(PipelineHealth::new());
    let worker = Arc::new(ValidationWorker::new(
        queue.clone(),
        registry.clone(),
        protocol,
        documents,
        Arc::new(LocalReportStorage::new()),
        retry_policy,
        Duration::from_secs(validation.idle_interval_secs),
        health.clone(),
    ));

    let mut worker_manager = WorkerManager::new();
    worker_manager.start_worker(worker);

    // 7. Start HTTP server
    let app = routes::app(ApiServices {
        lifecycle: lifecycle.clone(),
        batches: Arc::new(BatchService::new(lifecycle)),
        documents: Arc::new(DocumentUseCase::new(queue, registry, office_documents)),
        health,
    });

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped, waiting for workers");
    worker_manager.shutdown().await;
    info!("vericrawl stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
