// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::crawl_job::CrawlJob;
use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
    /// 存储的数据无法解析
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// 爬取任务仓库特质
///
/// 爬取任务记录的持久化接口。调用方把失败记录到日志，不做重试。
#[async_trait]
pub trait CrawlJobRepository: Send + Sync {
    /// 保存新创建的爬取任务
    async fn create(&self, job: &CrawlJob) -> Result<(), RepositoryError>;

    /// 根据ID查找爬取任务（包括已不再跟踪的历史任务）
    async fn find_by_id(&self, id: Uuid) -> Result<Option<CrawlJob>, RepositoryError>;

    /// 查找所有仍在跟踪中的任务，用于进程启动时恢复注册表
    async fn find_tracked(&self) -> Result<Vec<CrawlJob>, RepositoryError>;

    /// 更新任务的可变字段
    ///
    /// 包括状态、开始/完成时间、结果地址、收件人与通知标志
    async fn update(&self, job: &CrawlJob) -> Result<(), RepositoryError>;

    /// 删除任务记录（强制重新开始时使用）
    async fn remove(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// 停止跟踪任务，但保留记录供历史查询
    async fn untrack(&self, id: Uuid) -> Result<(), RepositoryError>;
}
