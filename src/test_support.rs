// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 单元测试使用的内存替身

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use uuid::Uuid;

use crate::domain::models::crawl_job::CrawlJob;
use crate::domain::models::office_document::OfficeDocument;
use crate::domain::models::validation::{RuleViolation, ValidationOutcome, ValidationTask};
use crate::domain::repositories::crawl_job_repository::{CrawlJobRepository, RepositoryError};
use crate::domain::repositories::office_document_repository::OfficeDocumentRepository;
use crate::domain::repositories::validated_document_repository::ValidatedDocumentRepository;
use crate::domain::services::notifier::{Notifier, NotifierError};
use crate::domain::services::validation_protocol::{
    RemoteStatus, RemoteValidationError, RemoteValidator,
};
use crate::engines::traits::{CrawlEngine, EngineError};

/// 记录调用的爬取引擎替身
#[derive(Default)]
pub struct FakeCrawlEngine {
    calls: Mutex<Vec<(&'static str, Uuid)>>,
    seeds: Mutex<HashMap<Uuid, Vec<String>>>,
    statuses: Mutex<HashMap<Uuid, String>>,
    failing: Mutex<HashSet<&'static str>>,
    pub unavailable: AtomicBool,
}

impl FakeCrawlEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// 让某个操作之后的调用失败
    pub fn fail(&self, op: &'static str) {
        self.failing.lock().insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.failing.lock().remove(op);
    }

    pub fn set_status(&self, id: Uuid, status: &str) {
        self.statuses.lock().insert(id, status.to_string());
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls.lock().iter().filter(|(o, _)| *o == op).count()
    }

    pub fn count_for(&self, op: &str, id: Uuid) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|(o, i)| *o == op && *i == id)
            .count()
    }

    pub fn seeds(&self, id: Uuid) -> Vec<String> {
        self.seeds.lock().get(&id).cloned().unwrap_or_default()
    }

    fn record(&self, op: &'static str, id: Uuid) -> Result<(), EngineError> {
        self.calls.lock().push((op, id));
        if self.failing.lock().contains(op) {
            return Err(EngineError::Other(format!("{} failed", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl CrawlEngine for FakeCrawlEngine {
    async fn create(&self, job_id: Uuid, seed_urls: &[String]) -> Result<(), EngineError> {
        self.record("create", job_id)?;
        self.seeds.lock().insert(job_id, seed_urls.to_vec());
        Ok(())
    }

    async fn build(&self, job_id: Uuid) -> Result<(), EngineError> {
        self.record("build", job_id)
    }

    async fn launch(&self, job_id: Uuid) -> Result<(), EngineError> {
        self.record("launch", job_id)?;
        self.statuses.lock().insert(job_id, "RUNNING".to_string());
        Ok(())
    }

    async fn pause(&self, job_id: Uuid) -> Result<(), EngineError> {
        self.record("pause", job_id)
    }

    async fn unpause(&self, job_id: Uuid) -> Result<(), EngineError> {
        self.record("unpause", job_id)
    }

    async fn terminate(&self, job_id: Uuid) -> Result<(), EngineError> {
        self.record("terminate", job_id)
    }

    async fn teardown(&self, job_id: Uuid) -> Result<(), EngineError> {
        self.record("teardown", job_id)
    }

    async fn status(&self, job_id: Uuid) -> Result<String, EngineError> {
        self.record("status", job_id)?;
        self.statuses
            .lock()
            .get(&job_id)
            .cloned()
            .ok_or(EngineError::JobNotFound(job_id))
    }

    async fn result_location(&self, job_id: Uuid) -> Result<String, EngineError> {
        self.record("result_location", job_id)?;
        Ok(format!("/jobs/{}/latest/", job_id))
    }

    async fn is_available(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// 内存爬取任务仓库
#[derive(Default)]
pub struct InMemoryCrawlJobRepository {
    pub jobs: Mutex<HashMap<Uuid, (CrawlJob, bool)>>,
    pub fail: AtomicBool,
}

impl InMemoryCrawlJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(&self, id: Uuid) -> Option<CrawlJob> {
        self.jobs.lock().get(&id).map(|(job, _)| job.clone())
    }

    pub fn is_tracked(&self, id: Uuid) -> bool {
        self.jobs.lock().get(&id).map(|(_, t)| *t).unwrap_or(false)
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RepositoryError::Corrupt("unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CrawlJobRepository for InMemoryCrawlJobRepository {
    async fn create(&self, job: &CrawlJob) -> Result<(), RepositoryError> {
        self.check()?;
        self.jobs.lock().insert(job.id, (job.clone(), true));
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CrawlJob>, RepositoryError> {
        self.check()?;
        Ok(self.stored(id))
    }

    async fn find_tracked(&self) -> Result<Vec<CrawlJob>, RepositoryError> {
        self.check()?;
        Ok(self
            .jobs
            .lock()
            .values()
            .filter(|(_, tracked)| *tracked)
            .map(|(job, _)| job.clone())
            .collect())
    }

    async fn update(&self, job: &CrawlJob) -> Result<(), RepositoryError> {
        self.check()?;
        let mut jobs = self.jobs.lock();
        match jobs.get_mut(&job.id) {
            Some(entry) => {
                entry.0 = job.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn remove(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.check()?;
        self.jobs.lock().remove(&id);
        Ok(())
    }

    async fn untrack(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.check()?;
        if let Some(entry) = self.jobs.lock().get_mut(&id) {
            entry.1 = false;
        }
        Ok(())
    }
}

/// 记录发送内容的通知替身
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String, String)>>,
    pub fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

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
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifierError::Rejected(500));
        }
        Ok(())
    }
}

/// 内存校验文档仓库
#[derive(Default)]
pub struct InMemoryValidatedDocumentRepository {
    pub errors: Mutex<Vec<(String, RuleViolation)>>,
    pub properties: Mutex<Vec<(String, String, String)>>,
    pub processing_errors: Mutex<Vec<(String, String)>>,
    pub selectors: BTreeMap<String, String>,
}

#[async_trait]
impl ValidatedDocumentRepository for InMemoryValidatedDocumentRepository {
    async fn add_error(
        &self,
        document_url: &str,
        error: &RuleViolation,
    ) -> Result<(), RepositoryError> {
        self.errors
            .lock()
            .push((document_url.to_string(), error.clone()));
        Ok(())
    }

    async fn add_property(
        &self,
        document_url: &str,
        name: &str,
        value: &str,
    ) -> Result<(), RepositoryError> {
        self.properties.lock().push((
            document_url.to_string(),
            name.to_string(),
            value.to_string(),
        ));
        Ok(())
    }

    async fn add_processing_error(
        &self,
        document_url: &str,
        message: &str,
    ) -> Result<(), RepositoryError> {
        self.processing_errors
            .lock()
            .push((document_url.to_string(), message.to_string()));
        Ok(())
    }

    async fn pdf_properties_with_xpath(&self) -> Result<BTreeMap<String, String>, RepositoryError> {
        Ok(self.selectors.clone())
    }
}

/// 内存办公文档仓库
#[derive(Default)]
pub struct InMemoryOfficeDocumentRepository {
    pub documents: Mutex<Vec<OfficeDocument>>,
}

#[async_trait]
impl OfficeDocumentRepository for InMemoryOfficeDocumentRepository {
    async fn add(&self, document: &OfficeDocument) -> Result<(), RepositoryError> {
        self.documents.lock().push(document.clone());
        Ok(())
    }

    async fn count_by_job(&self, job_id: Uuid) -> Result<u64, RepositoryError> {
        Ok(self
            .documents
            .lock()
            .iter()
            .filter(|d| d.job_id == job_id)
            .count() as u64)
    }
}

/// 按脚本返回状态的远程校验服务替身
///
/// 脚本耗尽后一直返回最后一个状态
pub struct ScriptedValidator {
    script: Mutex<VecDeque<Result<RemoteStatus, RemoteValidationError>>>,
    last: Mutex<RemoteStatus>,
    outcome: ValidationOutcome,
    pub settings_sent: AtomicU32,
    pub requests_sent: AtomicU32,
    pub polls: AtomicU32,
    pub requested_files: Mutex<Vec<PathBuf>>,
    pub transport_failures_on_request: AtomicU32,
}

impl ScriptedValidator {
    pub fn new(
        script: Vec<Result<RemoteStatus, RemoteValidationError>>,
        outcome: ValidationOutcome,
    ) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(RemoteStatus::Done),
            outcome,
            settings_sent: AtomicU32::new(0),
            requests_sent: AtomicU32::new(0),
            polls: AtomicU32::new(0),
            requested_files: Mutex::new(Vec::new()),
            transport_failures_on_request: AtomicU32::new(0),
        }
    }

    pub fn always(status: RemoteStatus) -> Self {
        let validator = Self::new(Vec::new(), ValidationOutcome::default());
        *validator.last.lock() = status;
        validator
    }

    /// 前 `n` 次提交请求返回传输错误
    pub fn with_unreachable_requests(self, n: u32) -> Self {
        self.transport_failures_on_request.store(n, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl RemoteValidator for ScriptedValidator {
    async fn send_settings(
        &self,
        _settings: &BTreeMap<String, String>,
    ) -> Result<(), RemoteValidationError> {
        self.settings_sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn send_request(&self, local_file: &Path) -> Result<(), RemoteValidationError> {
        self.requests_sent.fetch_add(1, Ordering::SeqCst);
        self.requested_files.lock().push(local_file.to_path_buf());
        let remaining = self.transport_failures_on_request.load(Ordering::SeqCst);
        if remaining > 0 {
            self.transport_failures_on_request
                .store(remaining - 1, Ordering::SeqCst);
            return Err(RemoteValidationError::Transport(
                "connection refused".to_string(),
            ));
        }
        Ok(())
    }

    async fn status(&self) -> Result<RemoteStatus, RemoteValidationError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().pop_front() {
            Some(Ok(status)) => {
                *self.last.lock() = status;
                Ok(status)
            }
            Some(Err(e)) => Err(e),
            None => Ok(*self.last.lock()),
        }
    }

    async fn fetch_result(&self) -> Result<ValidationOutcome, RemoteValidationError> {
        Ok(self.outcome.clone())
    }
}

/// 构造属于某个任务的校验任务
pub fn task_for(job_id: Uuid, name: &str, local_file: PathBuf) -> ValidationTask {
    ValidationTask {
        source_uri: format!("https://example.com/{}", name),
        local_file_path: local_file,
        output_directory: format!("/jobs/{}/latest/mirror", job_id),
        observed_timestamp: "2026-03-01T10:00:00Z".to_string(),
    }
}
