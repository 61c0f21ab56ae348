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

use chrono::{DateTime, NaiveDate, Utc};
use metrics::counter;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::models::crawl_job::{CrawlJob, CrawlJobStatus};
use crate::domain::models::ledger::LedgerSnapshot;
use crate::domain::repositories::crawl_job_repository::{CrawlJobRepository, RepositoryError};
use crate::domain::services::job_registry::{JobRegistry, Reservation};
use crate::domain::services::notifier::Notifier;
use crate::engines::traits::{CrawlEngine, EngineError};
use crate::infrastructure::metrics::{JOBS_STARTED, NOTIFICATIONS_SENT};
use crate::utils::url_utils::{is_crawlable, normalize_crawl_url, seed_urls};

/// 通知主题
pub const NOTIFICATION_SUBJECT: &str = "Crawl job";

/// 启动爬取任务的请求
#[derive(Debug, Clone, Default)]
pub struct StartJobRequest {
    /// 待爬取的域名或URL
    pub domain: String,
    /// 计划日期
    pub scheduled_date: Option<NaiveDate>,
    /// 通知收件人
    pub report_email: Option<String>,
    /// 是否强制重新开始
    pub force_start: bool,
}

/// 爬取任务报告
///
/// 生命周期操作总是返回尽力而为的报告，而不是错误
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    /// 任务ID，启动失败时为空
    pub id: Option<Uuid>,
    /// 规范化后的爬取URL
    pub crawl_url: String,
    /// 任务状态
    pub status: CrawlJobStatus,
    /// 引擎返回的原始状态文本
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_status: Option<String>,
    /// 计划日期
    pub scheduled_date: Option<NaiveDate>,
    /// 开始时间
    pub start_time: Option<DateTime<Utc>>,
    /// 完成时间
    pub finish_time: Option<DateTime<Utc>>,
    /// 结果地址
    pub result_url: String,
    /// 通知收件人
    pub report_email: Option<String>,
    /// 是否已发送通知
    pub email_notification_sent: bool,
    /// 错误统计
    pub errors: LedgerSnapshot,
}

impl JobReport {
    /// 根据任务生成报告
    pub fn from_job(job: &CrawlJob, engine_status: Option<String>) -> Self {
        Self {
            id: Some(job.id),
            crawl_url: job.crawl_url.clone(),
            status: job.status,
            engine_status,
            scheduled_date: job.scheduled_date,
            start_time: Some(job.start_time),
            finish_time: job.finish_time,
            result_url: job.result_url.clone(),
            report_email: job.report_email.clone(),
            email_notification_sent: job.email_notification_sent,
            errors: job.ledger.snapshot(),
        }
    }

    /// 引擎未能创建任务时的报告
    pub fn unbuilt(crawl_url: String, report_email: Option<String>) -> Self {
        Self {
            id: None,
            crawl_url,
            status: CrawlJobStatus::Created,
            engine_status: Some("UNBUILT".to_string()),
            scheduled_date: None,
            start_time: None,
            finish_time: None,
            result_url: String::new(),
            report_email,
            email_notification_sent: false,
            errors: LedgerSnapshot::default(),
        }
    }
}

/// 状态迁移结果
#[derive(Debug, Clone)]
pub enum TransitionResult {
    /// 迁移已生效
    Applied(JobReport),
    /// 状态未变化（不允许的迁移或外部调用失败）
    Unchanged(JobReport),
    /// 任务未被跟踪
    NotFound,
}

impl TransitionResult {
    /// 获取报告
    pub fn report(&self) -> Option<&JobReport> {
        match self {
            TransitionResult::Applied(report) | TransitionResult::Unchanged(report) => Some(report),
            TransitionResult::NotFound => None,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, TransitionResult::Applied(_))
    }
}

#[derive(Debug, Clone, Copy)]
enum EngineAction {
    Pause,
    Unpause,
    Terminate,
}

/// 爬取任务生命周期管理器
///
/// 持有被跟踪任务的注册表，把状态迁移委托给爬取引擎并持久化到仓库。
/// 所有外部失败都在这里记录日志后吞掉，调用方只会看到状态没有变化。
pub struct CrawlLifecycleManager {
    registry: Arc<JobRegistry>,
    engine: Arc<dyn CrawlEngine>,
    repository: Arc<dyn CrawlJobRepository>,
    notifier: Arc<dyn Notifier>,
    public_url: String,
}

impl CrawlLifecycleManager {
    /// 创建新的生命周期管理器
    ///
    /// # 参数
    ///
    /// * `registry` - 任务注册表
    /// * `engine` - 爬取引擎
    /// * `repository` - 爬取任务仓库
    /// * `notifier` - 通知服务
    /// * `public_url` - 对外地址，用于通知中的任务链接
    pub fn new(
        registry: Arc<JobRegistry>,
        engine: Arc<dyn CrawlEngine>,
        repository: Arc<dyn CrawlJobRepository>,
        notifier: Arc<dyn Notifier>,
        public_url: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            engine,
            repository,
            notifier,
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// 任务注册表
    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    /// 爬取引擎
    pub fn engine(&self) -> &Arc<dyn CrawlEngine> {
        &self.engine
    }

    /// 从仓库恢复仍在跟踪的任务
    ///
    /// 进程启动时、校验队列重新加载之前调用
    pub async fn restore_from_repository(&self) -> Result<usize, RepositoryError> {
        let jobs = self.repository.find_tracked().await?;
        let mut restored = 0;
        for job in jobs {
            let id = job.id;
            if self.registry.restore(job) {
                restored += 1;
            } else {
                warn!("Skipping stored job {} with duplicate crawl url", id);
            }
        }
        info!("Restored {} tracked crawl jobs", restored);
        Ok(restored)
    }

    /// 启动爬取任务
    ///
    /// 同一规范化URL已有任务且未强制启动时，直接返回已有任务；
    /// 强制启动时先拆除旧的引擎任务并删除旧记录。规范化后无法爬取的URL
    /// 不会登记，返回未构建的报告。
    pub async fn start(&self, request: StartJobRequest) -> JobReport {
        let crawl_url = normalize_crawl_url(&request.domain);
        if !is_crawlable(&crawl_url) {
            warn!("Refusing to crawl {}: not an http(s) URL with a host", crawl_url);
            return JobReport::unbuilt(crawl_url, request.report_email);
        }
        let job = CrawlJob::new(
            crawl_url.clone(),
            request.scheduled_date,
            request.report_email.clone(),
        );
        let id = job.id;

        match self.registry.reserve(job, request.force_start) {
            Reservation::Existing(existing) => {
                info!(
                    "Crawl job {} already tracks {}, returning it",
                    existing.id, crawl_url
                );
                return JobReport::from_job(&existing, None);
            }
            Reservation::Replaced { previous } => {
                info!(
                    "Force start for {}: replacing crawl job {} with {}",
                    crawl_url, previous.id, id
                );
                if let Err(e) = self.engine.teardown(previous.id).await {
                    warn!("Failed to tear down crawl job {}: {}", previous.id, e);
                }
                if let Err(e) = self.repository.remove(previous.id).await {
                    error!("Failed to remove crawl job {}: {}", previous.id, e);
                }
            }
            Reservation::Reserved => {}
        }

        let seeds = seed_urls(&request.domain);
        if let Err(e) = self.launch_engine_job(id, &seeds).await {
            warn!("Failed to start crawl job {} for {}: {}", id, crawl_url, e);
            self.registry.remove(id);
            return JobReport::unbuilt(crawl_url, request.report_email);
        }

        let job = self.registry.update(id, |job| {
            job.status = CrawlJobStatus::Running;
            job.clone()
        });
        let Some(job) = job else {
            // Replaced or deleted while the engine was launching it
            warn!("Crawl job {} was dropped during start", id);
            if let Err(e) = self.engine.teardown(id).await {
                warn!("Failed to tear down crawl job {}: {}", id, e);
            }
            return JobReport::unbuilt(crawl_url, request.report_email);
        };

        if let Err(e) = self.repository.create(&job).await {
            error!("Failed to persist crawl job {}: {}", id, e);
        }
        counter!(JOBS_STARTED).increment(1);
        info!("Started crawl job {} for {}", id, crawl_url);
        JobReport::from_job(&job, None)
    }

    /// 暂停运行中的任务
    pub async fn pause(&self, id: Uuid) -> TransitionResult {
        self.transition(
            id,
            EngineAction::Pause,
            |s| s == CrawlJobStatus::Running,
            CrawlJobStatus::Paused,
        )
        .await
    }

    /// 恢复已暂停的任务
    pub async fn unpause(&self, id: Uuid) -> TransitionResult {
        self.transition(
            id,
            EngineAction::Unpause,
            |s| s == CrawlJobStatus::Paused,
            CrawlJobStatus::Running,
        )
        .await
    }

    /// 终止运行中或已暂停的任务
    pub async fn terminate(&self, id: Uuid) -> TransitionResult {
        self.transition(
            id,
            EngineAction::Terminate,
            |s| s.is_active(),
            CrawlJobStatus::Terminated,
        )
        .await
    }

    /// 删除任务
    ///
    /// 活动中的任务先终止，然后停止跟踪；记录保留供历史查询
    pub async fn delete(&self, id: Uuid) -> TransitionResult {
        let Some(job) = self.registry.get(id) else {
            return TransitionResult::NotFound;
        };

        if job.status.is_active() {
            if let Err(e) = self.engine.terminate(id).await {
                warn!("Failed to terminate crawl job {} before delete: {}", id, e);
            }
        }

        let Some(removed) = self.registry.remove(id) else {
            return TransitionResult::NotFound;
        };
        if let Err(e) = self.repository.untrack(id).await {
            error!("Failed to untrack crawl job {}: {}", id, e);
        }
        info!("Deleted crawl job {} ({})", id, removed.crawl_url);
        TransitionResult::Applied(JobReport::from_job(&removed, None))
    }

    /// 重启任务
    ///
    /// 拆除并重新创建引擎任务；成功后重置开始时间、账本和通知标志
    pub async fn restart(&self, id: Uuid) -> TransitionResult {
        let Some(job) = self.registry.get(id) else {
            return TransitionResult::NotFound;
        };

        if let Err(e) = self.engine.teardown(id).await {
            debug!("Teardown before restart of {} failed: {}", id, e);
        }
        let seeds = seed_urls(&job.crawl_url);
        if let Err(e) = self.launch_engine_job(id, &seeds).await {
            warn!("Failed to restart crawl job {}: {}", id, e);
            return TransitionResult::Unchanged(JobReport::from_job(&job, None));
        }

        let Some(job) = self.registry.update(id, |job| {
            job.reset_for_restart(Utc::now());
            job.clone()
        }) else {
            return TransitionResult::NotFound;
        };
        self.persist(&job).await;
        info!("Restarted crawl job {} for {}", id, job.crawl_url);
        TransitionResult::Applied(JobReport::from_job(&job, None))
    }

    /// 设置通知收件人
    ///
    /// 通知已经发出后不再修改
    pub async fn set_report_email(&self, id: Uuid, email: String) -> TransitionResult {
        let recipient = Some(email).filter(|e| !e.trim().is_empty());
        let Some((applied, job)) = self.registry.update(id, |job| {
            if job.email_notification_sent {
                return (false, job.clone());
            }
            job.report_email = recipient;
            (true, job.clone())
        }) else {
            return TransitionResult::NotFound;
        };

        if !applied {
            return TransitionResult::Unchanged(JobReport::from_job(&job, None));
        }
        self.persist(&job).await;
        TransitionResult::Applied(JobReport::from_job(&job, None))
    }

    /// 查询任务状态
    ///
    /// 活动任务组合引擎实时状态与已存储的元数据；首次观察到终止状态时
    /// 记录完成信息、发送通知并拆除引擎任务。已完成的任务直接返回缓存状态。
    /// 未被跟踪的任务回退到仓库中的历史记录。
    pub async fn get_job(&self, id: Uuid) -> Option<JobReport> {
        let Some(job) = self.registry.get(id) else {
            return self.historical_report(id).await;
        };

        if job.is_finalized() {
            return Some(self.deliver_pending_notification(job).await);
        }

        let engine_status = match self.engine.status(id).await {
            Ok(status) => status,
            Err(e) => {
                warn!("Failed to query crawl engine for {}: {}", id, e);
                return Some(JobReport::from_job(&job, None));
            }
        };

        match CrawlJobStatus::from_engine_status(&engine_status) {
            Some(observed) if observed.is_terminal() => {
                self.finish(job, observed, engine_status).await
            }
            Some(observed) => {
                let (changed, job) = self.registry.update(id, |job| {
                    let updatable = matches!(
                        job.status,
                        CrawlJobStatus::Created | CrawlJobStatus::Running | CrawlJobStatus::Paused
                    );
                    let changed = updatable && !job.is_finalized() && job.status != observed;
                    if changed {
                        job.status = observed;
                    }
                    (changed, job.clone())
                })?;
                if changed {
                    self.persist(&job).await;
                }
                Some(JobReport::from_job(&job, Some(engine_status)))
            }
            None => {
                debug!("Unrecognised engine status '{}' for {}", engine_status, id);
                Some(JobReport::from_job(&job, Some(engine_status)))
            }
        }
    }

    /// 引擎是否可用
    pub async fn engine_available(&self) -> bool {
        self.engine.is_available().await
    }

    async fn finish(
        &self,
        job: CrawlJob,
        observed: CrawlJobStatus,
        engine_status: String,
    ) -> Option<JobReport> {
        let id = job.id;
        let result_url = match self.engine.result_location(id).await {
            Ok(location) => location,
            Err(e) => {
                warn!("Failed to resolve result location for {}: {}", id, e);
                return Some(JobReport::from_job(&job, Some(engine_status)));
            }
        };

        let now = Utc::now();
        let (first, recipient, job) = self.registry.update(id, |job| {
            let first = job.record_finish(observed, result_url, now);
            let recipient = if first { job.claim_notification() } else { None };
            (first, recipient, job.clone())
        })?;

        if first {
            info!("Crawl job {} reached {} ({})", id, observed, engine_status);
            if let Some(recipient) = recipient {
                self.notify(&recipient, &job).await;
            }
            if let Err(e) = self.engine.teardown(id).await {
                warn!("Failed to tear down finished crawl job {}: {}", id, e);
            }
            self.persist(&job).await;
        }
        Some(JobReport::from_job(&job, Some(engine_status)))
    }

    async fn deliver_pending_notification(&self, job: CrawlJob) -> JobReport {
        let claimed = self
            .registry
            .update(job.id, |job| job.claim_notification().map(|r| (r, job.clone())))
            .flatten();
        match claimed {
            Some((recipient, job)) => {
                self.notify(&recipient, &job).await;
                self.persist(&job).await;
                JobReport::from_job(&job, None)
            }
            None => JobReport::from_job(&job, None),
        }
    }

    async fn historical_report(&self, id: Uuid) -> Option<JobReport> {
        match self.repository.find_by_id(id).await {
            Ok(Some(job)) => Some(JobReport::from_job(&job, None)),
            Ok(None) => None,
            Err(e) => {
                error!("Failed to load crawl job {}: {}", id, e);
                None
            }
        }
    }

    async fn transition(
        &self,
        id: Uuid,
        action: EngineAction,
        allowed: impl Fn(CrawlJobStatus) -> bool,
        target: CrawlJobStatus,
    ) -> TransitionResult {
        let Some(job) = self.registry.get(id) else {
            return TransitionResult::NotFound;
        };
        if !allowed(job.status) {
            debug!(
                "Ignoring {:?} for crawl job {} in state {}",
                action, id, job.status
            );
            return TransitionResult::Unchanged(JobReport::from_job(&job, None));
        }

        if let Err(e) = self.call_engine(action, id).await {
            warn!("Crawl engine rejected {:?} for {}: {}", action, id, e);
            return TransitionResult::Unchanged(JobReport::from_job(&job, None));
        }

        let Some((applied, job)) = self.registry.update(id, |job| {
            let applied = allowed(job.status);
            if applied {
                job.status = target;
            }
            (applied, job.clone())
        }) else {
            return TransitionResult::NotFound;
        };

        if !applied {
            return TransitionResult::Unchanged(JobReport::from_job(&job, None));
        }
        self.persist(&job).await;
        info!("Crawl job {} is now {}", id, target);
        TransitionResult::Applied(JobReport::from_job(&job, None))
    }

    async fn call_engine(&self, action: EngineAction, id: Uuid) -> Result<(), EngineError> {
        match action {
            EngineAction::Pause => self.engine.pause(id).await,
            EngineAction::Unpause => self.engine.unpause(id).await,
            EngineAction::Terminate => self.engine.terminate(id).await,
        }
    }

    async fn launch_engine_job(&self, id: Uuid, seeds: &[String]) -> Result<(), EngineError> {
        self.engine.create(id, seeds).await?;
        self.engine.build(id).await?;
        self.engine.launch(id).await?;
        Ok(())
    }

    async fn persist(&self, job: &CrawlJob) {
        if let Err(e) = self.repository.update(job).await {
            error!("Failed to persist crawl job {}: {}", job.id, e);
        }
    }

    async fn notify(&self, recipient: &str, job: &CrawlJob) {
        let body = notification_body(&self.public_url, job);
        match self
            .notifier
            .send(recipient, NOTIFICATION_SUBJECT, &body)
            .await
        {
            Ok(()) => {
                counter!(NOTIFICATIONS_SENT).increment(1);
                info!("Sent completion notice for {} to {}", job.id, recipient);
            }
            Err(e) => error!("Failed to notify {} about {}: {}", recipient, job.id, e),
        }
    }
}

/// 生成完成通知正文
pub fn notification_body(public_url: &str, job: &CrawlJob) -> String {
    format!(
        "Crawl job on {} was finished with status {}\nResults are available at {}/jobinfo?id={}",
        job.crawl_url, job.status, public_url, job.id
    )
}

#[cfg(test)]
#[path = "lifecycle_service_test.rs"]
mod tests;
