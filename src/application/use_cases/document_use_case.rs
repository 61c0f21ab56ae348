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
use crate::application::dto::document_request::{OfficeFileDto, ValidationTaskDto};
use crate::domain::models::office_document::OfficeDocumentKind;
use crate::domain::models::validation::ValidationTask;
use crate::domain::repositories::office_document_repository::OfficeDocumentRepository;
use crate::domain::repositories::RepositoryError;
use crate::domain::services::job_registry::JobRegistry;
use crate::queue::validation_queue::{QueueError, ValidationQueue};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use validator::Validate;

#[derive(Error, Debug)]
pub enum DocumentUseCaseError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("No tracked crawl job owns {0}")]
    UnknownJob(String),
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// 文档提交用例
///
/// 接收爬取引擎发现的文档：PDF进入校验队列，办公文档只记录元数据
pub struct DocumentUseCase {
    queue: Arc<ValidationQueue>,
    registry: Arc<JobRegistry>,
    office_documents: Arc<dyn OfficeDocumentRepository>,
}

impl DocumentUseCase {
    pub fn new(
        queue: Arc<ValidationQueue>,
        registry: Arc<JobRegistry>,
        office_documents: Arc<dyn OfficeDocumentRepository>,
    ) -> Self {
        Self {
            queue,
            registry,
            office_documents,
        }
    }

    /// 提交校验任务
    ///
    /// 任务所属的爬取任务必须仍在跟踪中，否则结果无处记录
    ///
    /// # 返回值
    ///
    /// * `Ok(usize)` - 入队后的队列长度
    /// * `Err(DocumentUseCaseError)` - 请求无效、所属任务未知或队列持久化失败
    pub async fn submit_validation(
        &self,
        dto: ValidationTaskDto,
    ) -> Result<usize, DocumentUseCaseError> {
        dto.validate()
            .map_err(|e| DocumentUseCaseError::ValidationError(e.to_string()))?;

        let task = ValidationTask::from(dto);
        match task.owner_job_id() {
            Some(id) if self.registry.contains(id) => {}
            _ => {
                warn!(
                    "Rejecting validation task for {}: {} is not a tracked job directory",
                    task.source_uri, task.output_directory
                );
                return Err(DocumentUseCaseError::UnknownJob(task.output_directory));
            }
        }

        let depth = self.queue.enqueue(task).await?;
        Ok(depth)
    }

    /// 记录办公文档元数据
    pub async fn submit_office_document(
        &self,
        dto: OfficeFileDto,
        kind: OfficeDocumentKind,
    ) -> Result<(), DocumentUseCaseError> {
        dto.validate()
            .map_err(|e| DocumentUseCaseError::ValidationError(e.to_string()))?;

        let document = dto.into_document(kind);
        self.office_documents.add(&document).await?;
        info!(
            "Recorded {} document {} for job {}",
            kind, document.file_url, document.job_id
        );
        Ok(())
    }

    pub async fn queue_depth(&self) -> usize {
        self.queue.len().await
    }
}
