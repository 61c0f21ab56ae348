// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::RepositoryError;
use crate::domain::models::office_document::OfficeDocument;
use async_trait::async_trait;
use uuid::Uuid;

/// 办公文档仓库特质
#[async_trait]
pub trait OfficeDocumentRepository: Send + Sync {
    /// 保存办公文档元数据
    async fn add(&self, document: &OfficeDocument) -> Result<(), RepositoryError>;

    /// 统计某个爬取任务发现的办公文档数量
    async fn count_by_job(&self, job_id: Uuid) -> Result<u64, RepositoryError>;
}
