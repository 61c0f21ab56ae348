// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use axum_test::TestServer;
use parking_lot::Mutex;
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;
use vericrawl::application::use_cases::document_use_case::DocumentUseCase;
use vericrawl::config::settings::DatabaseSettings;
use vericrawl::domain::services::batch_service::BatchService;
use vericrawl::domain::services::job_registry::JobRegistry;
use vericrawl::domain::services::lifecycle_service::CrawlLifecycleManager;
use vericrawl::domain::services::notifier::{Notifier, NotifierError};
use vericrawl::engines::traits::{CrawlEngine, EngineError};
use vericrawl::infrastructure::database::connection;
use vericrawl::infrastructure::repositories::crawl_job_repo_impl::CrawlJobRepositoryImpl;
use vericrawl::infrastructure::repositories::office_document_repo_impl::OfficeDocumentRepositoryImpl;
use vericrawl::presentation::routes::{self, ApiServices};
use vericrawl::queue::validation_queue::ValidationQueue;
use vericrawl::workers::health::PipelineHealth;

/// 按任务记录状态文本的爬取引擎替身
#[derive(Default)]
pub struct StubEngine {
    statuses: Mutex<HashMap<Uuid, String>>,
    pub actions: Mutex<Vec<(String, Uuid)>>,
    pub unavailable: AtomicBool,
}

impl StubEngine {
    pub fn set_status(&self, id: Uuid, status: &str) {
        self.statuses.lock().insert(id, status.to_string());
    }

    pub fn actions_for(&self, id: Uuid) -> Vec<String> {
        self.actions
            .lock()
            .iter()
            .filter(|(_, job)| *job == id)
            .map(|(action, _)| action.clone())
            .collect()
    }

    fn record(&self, action: &str, id: Uuid) {
        self.actions.lock().push((action.to_string(), id));
    }
}

#[async_trait]
impl CrawlEngine for StubEngine {
    async fn create(&self, job_id: Uuid, _seed_urls: &[String]) -> Result<(), EngineError> {
        self.record("create", job_id);
        Ok(())
    }

    async fn build(&self, job_id: Uuid) -> Result<(), EngineError> {
        self.record("build", job_id);
        Ok(())
    }

    async fn launch(&self, job_id: Uuid) -> Result<(), EngineError> {
        self.record("launch", job_id);
        self.set_status(job_id, "RUNNING");
        Ok(())
    }

    async fn pause(&self, job_id: Uuid) -> Result<(), EngineError> {
        self.record("pause", job_id);
        self.set_status(job_id, "PAUSED");
        Ok(())
    }

    async fn unpause(&self, job_id: Uuid) -> Result<(), EngineError> {
        self.record("unpause", job_id);
        self.set_status(job_id, "RUNNING");
        Ok(())
    }

    async fn terminate(&self, job_id: Uuid) -> Result<(), EngineError> {
        self.record("terminate", job_id);
        Ok(())
    }

    async fn teardown(&self, job_id: Uuid) -> Result<(), EngineError> {
        self.record("teardown", job_id);
        Ok(())
    }

    async fn status(&self, job_id: Uuid) -> Result<String, EngineError> {
        self.statuses
            .lock()
            .get(&job_id)
            .cloned()
            .ok_or(EngineError::JobNotFound(job_id))
    }

    async fn result_location(&self, job_id: Uuid) -> Result<String, EngineError> {
        Ok(format!("/jobs/{}/latest/", job_id))
    }

    async fn is_available(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// 记录所有通知的通知器
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingNotifier {
    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifierError> {
        self.sent
            .lock()
            .push((recipient.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

pub async fn memory_database() -> Arc<DatabaseConnection> {
    let settings = DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        max_connections: Some(1),
        min_connections: None,
        connect_timeout: None,
        idle_timeout: None,
    };
    Arc::new(connection::connect_and_migrate(&settings).await.unwrap())
}

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<DatabaseConnection>,
    pub engine: Arc<StubEngine>,
    pub notifier: Arc<RecordingNotifier>,
    pub lifecycle: Arc<CrawlLifecycleManager>,
    pub queue: Arc<ValidationQueue>,
    pub health: Arc<PipelineHealth>,
    pub dir: TempDir,
}

pub async fn create_test_app() -> TestApp {
    let db = memory_database().await;
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(StubEngine::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let registry = Arc::new(JobRegistry::new());

    let lifecycle = Arc::new(CrawlLifecycleManager::new(
        registry.clone(),
        engine.clone(),
        Arc::new(CrawlJobRepositoryImpl::new(db.clone())),
        notifier.clone(),
        "http://vericrawl.test/",
    ));
    let queue = Arc::new(ValidationQueue::new(dir.path().join("validation-jobs.txt")));
    let health = Arc::new(PipelineHealth::new());

    let app = routes::app(ApiServices {
        lifecycle: lifecycle.clone(),
        batches: Arc::new(BatchService::new(lifecycle.clone())),
        documents: Arc::new(DocumentUseCase::new(
            queue.clone(),
            registry,
            Arc::new(OfficeDocumentRepositoryImpl::new(db.clone())),
        )),
        health: health.clone(),
    });

    TestApp {
        server: TestServer::new(app).unwrap(),
        db,
        engine,
        notifier,
        lifecycle,
        queue,
        health,
        dir,
    }
}
