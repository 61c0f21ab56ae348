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

use async_trait::async_trait;
use metrics::{counter, histogram};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::domain::models::validation::{InvalidReportEntry, ValidationOutcome, ValidationTask};
use crate::domain::repositories::report_storage::ReportStorage;
use crate::domain::repositories::validated_document_repository::ValidatedDocumentRepository;
use crate::domain::services::job_registry::JobRegistry;
use crate::domain::services::validation_protocol::{ProtocolError, ValidationProtocol};
use crate::infrastructure::metrics::{TRANSPORT_RETRIES, VALIDATION_DURATION, VALIDATION_TASKS};
use crate::queue::validation_queue::ValidationQueue;
use crate::utils::errors::WorkerError;
use crate::utils::retry_policy::RetryPolicy;
use crate::utils::shutdown::sleep_or_shutdown;
use crate::workers::health::PipelineHealth;
use crate::workers::worker::Worker;

/// 单个任务的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskFlow {
    Completed,
    Cancelled,
}

/// 校验工作器
///
/// 唯一的队列消费者。队列非空时逐个取出任务执行远程校验协议，
/// 队列为空时等待固定间隔。单个任务的失败只记录为处理错误，
/// 不会让循环退出。
pub struct ValidationWorker {
    queue: Arc<ValidationQueue>,
    registry: Arc<JobRegistry>,
    protocol: ValidationProtocol,
    documents: Arc<dyn ValidatedDocumentRepository>,
    reports: Arc<dyn ReportStorage>,
    retry_policy: RetryPolicy,
    idle_interval: Duration,
    health: Arc<PipelineHealth>,
}

impl ValidationWorker {
    /// 创建新的校验工作器
    ///
    /// # 参数
    ///
    /// * `queue` - 校验任务队列
    /// * `registry` - 任务注册表，用于解析任务所属的账本
    /// * `protocol` - 远程校验协议
    /// * `documents` - 校验文档仓库
    /// * `reports` - 报告存储
    /// * `retry_policy` - 传输失败时的重试策略
    /// * `idle_interval` - 队列为空时的等待时间
    /// * `health` - 健康信号
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        queue: Arc<ValidationQueue>,
        registry: Arc<JobRegistry>,
        protocol: ValidationProtocol,
        documents: Arc<dyn ValidatedDocumentRepository>,
        reports: Arc<dyn ReportStorage>,
        retry_policy: RetryPolicy,
        idle_interval: Duration,
        health: Arc<PipelineHealth>,
    ) -> Self {
        Self {
            queue,
            registry,
            protocol,
            documents,
            reports,
            retry_policy,
            idle_interval,
            health,
        }
    }

    /// 处理单个任务
    ///
    /// 被关闭信号打断的任务放回队首，放回失败时返回错误
    async fn process(
        &self,
        task: ValidationTask,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<TaskFlow, WorkerError> {
        let started = Instant::now();
        info!("Validating {}", task.source_uri);

        match self.validate_with_retry(&task, shutdown).await {
            Ok(outcome) => {
                counter!(VALIDATION_TASKS, "outcome" => if outcome.is_valid { "valid" } else { "invalid" })
                    .increment(1);
                self.record(&task, &outcome).await;
                self.health.record_processed(true);
            }
            Err(ProtocolError::Cancelled) => {
                info!("Validation of {} interrupted by shutdown", task.source_uri);
                self.queue
                    .push_front(task)
                    .await
                    .map_err(|e| WorkerError::QueueError(e.to_string()))?;
                return Ok(TaskFlow::Cancelled);
            }
            Err(e) => {
                warn!("Validation of {} failed: {}", task.source_uri, e);
                counter!(VALIDATION_TASKS, "outcome" => "failed").increment(1);
                self.record(&task, &ValidationOutcome::processing_failure(e.to_string()))
                    .await;
                self.health.record_processed(false);
            }
        }

        remove_local_file(&task).await;
        histogram!(VALIDATION_DURATION).record(started.elapsed().as_secs_f64());
        Ok(TaskFlow::Completed)
    }

    /// 执行校验协议，传输失败时按重试策略重试
    async fn validate_with_retry(
        &self,
        task: &ValidationTask,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<ValidationOutcome, ProtocolError> {
        let mut retries = 0u32;
        loop {
            let settings = self.validation_settings().await;
            match self.protocol.run(&settings, task, shutdown).await {
                Err(e) if e.is_transport() => {
                    self.health.record_transport_failure(&e.to_string());
                    if !self.retry_policy.should_retry(retries) {
                        return Err(e);
                    }
                    retries += 1;
                    counter!(TRANSPORT_RETRIES).increment(1);
                    let backoff = self.retry_policy.calculate_backoff(retries);
                    warn!(
                        "Validation service unreachable ({}), retry {} in {:?}",
                        e, retries, backoff
                    );
                    if sleep_or_shutdown(backoff, shutdown).await {
                        return Err(ProtocolError::Cancelled);
                    }
                }
                result => {
                    if !matches!(result, Err(ProtocolError::Cancelled)) {
                        self.health.record_reachable();
                    }
                    return result;
                }
            }
        }
    }

    async fn validation_settings(&self) -> BTreeMap<String, String> {
        match self.documents.pdf_properties_with_xpath().await {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to load validation settings, sending none: {}", e);
                BTreeMap::new()
            }
        }
    }

    /// 记录校验结果
    ///
    /// 逐条保存错误、属性和处理错误，写入报告，再合并到所属任务的账本
    async fn record(&self, task: &ValidationTask, outcome: &ValidationOutcome) {
        let uri = task.source_uri.as_str();
        for violation in &outcome.errors {
            if let Err(e) = self.documents.add_error(uri, violation).await {
                error!("Failed to record validation error for {}: {}", uri, e);
            }
        }
        for (name, value) in &outcome.properties {
            if let Err(e) = self.documents.add_property(uri, name, value).await {
                error!("Failed to record property {} for {}: {}", name, uri, e);
            }
        }
        if let Some(message) = &outcome.processing_error {
            if let Err(e) = self.documents.add_processing_error(uri, message).await {
                error!("Failed to record processing error for {}: {}", uri, e);
            }
        }

        let written = if outcome.is_valid {
            self.reports
                .append_valid(&task.output_directory, uri, &task.observed_timestamp)
                .await
        } else {
            let entry = InvalidReportEntry {
                url: task.source_uri.clone(),
                last_modified: task.observed_timestamp.clone(),
                outcome: outcome.clone(),
            };
            self.reports
                .append_invalid(&task.output_directory, &entry)
                .await
        };
        if let Err(e) = written {
            error!("Failed to write report entry for {}: {}", uri, e);
        }

        match task.owner_job_id().and_then(|id| self.registry.ledger(id)) {
            Some(ledger) => ledger.record_outcome(outcome),
            None => error!(
                "No tracked crawl job owns {} ({}), ledger not updated",
                uri, task.output_directory
            ),
        }
    }
}

async fn remove_local_file(task: &ValidationTask) {
    match tokio::fs::remove_file(&task.local_file_path).await {
        Ok(()) => debug!("Removed {}", task.local_file_path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            "Failed to remove {}: {}",
            task.local_file_path.display(),
            e
        ),
    }
}

#[async_trait]
impl Worker for ValidationWorker {
    async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), WorkerError> {
        self.health.set_running(true);
        info!("Validation worker started");

        let mut result = Ok(());
        loop {
            if *shutdown.borrow() {
                break;
            }
            match self.queue.dequeue().await {
                Ok(Some(task)) => match self.process(task, &mut shutdown).await {
                    Ok(TaskFlow::Completed) => {}
                    Ok(TaskFlow::Cancelled) => break,
                    Err(e) => {
                        error!("Failed to requeue interrupted validation task: {}", e);
                        result = Err(e);
                        break;
                    }
                },
                Ok(None) => {
                    if sleep_or_shutdown(self.idle_interval, &mut shutdown).await {
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to dequeue validation task: {}", e);
                    self.health.record_queue_error(&e.to_string());
                    if sleep_or_shutdown(self.idle_interval, &mut shutdown).await {
                        break;
                    }
                }
            }
        }

        self.health.set_running(false);
        info!("Validation worker stopped");
        result
    }

    fn name(&self) -> &str {
        "validation"
    }
}

#[cfg(test)]
#[path = "validation_worker_test.rs"]
mod tests;
