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
use crate::domain::models::crawl_job::{CrawlJob, CrawlJobStatus};
use crate::domain::repositories::crawl_job_repository::{CrawlJobRepository, RepositoryError};
use crate::infrastructure::database::entities::crawl_job as crawl_job_entity;
use async_trait::async_trait;
use sea_orm::{sea_query::Expr, *};
use std::sync::Arc;
use uuid::Uuid;

/// 爬取任务仓库实现
pub struct CrawlJobRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl CrawlJobRepositoryImpl {
    /// 创建新的爬取任务仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

/// 把数据库记录转换为领域模型
///
/// 账本不持久化，恢复的任务从空账本开始
fn to_domain(m: crawl_job_entity::Model) -> Result<CrawlJob, RepositoryError> {
    let status = m
        .status
        .parse::<CrawlJobStatus>()
        .map_err(|_| RepositoryError::Corrupt(format!("invalid crawl job status '{}'", m.status)))?;

    Ok(CrawlJob {
        id: m.id,
        crawl_url: m.crawl_url,
        status,
        scheduled_date: m.scheduled_date,
        start_time: m.start_time.into(),
        finish_time: m.finish_time.map(Into::into),
        result_url: m.result_url,
        report_email: m.report_email,
        email_notification_sent: m.email_notification_sent,
        ledger: Default::default(),
    })
}

#[async_trait]
impl CrawlJobRepository for CrawlJobRepositoryImpl {
    async fn create(&self, job: &CrawlJob) -> Result<(), RepositoryError> {
        let model = crawl_job_entity::ActiveModel {
            id: Set(job.id),
            crawl_url: Set(job.crawl_url.clone()),
            status: Set(job.status.to_string()),
            scheduled_date: Set(job.scheduled_date),
            start_time: Set(job.start_time.into()),
            finish_time: Set(job.finish_time.map(Into::into)),
            result_url: Set(job.result_url.clone()),
            report_email: Set(job.report_email.clone()),
            email_notification_sent: Set(job.email_notification_sent),
            tracked: Set(true),
        };

        model.insert(self.db.as_ref()).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CrawlJob>, RepositoryError> {
        crawl_job_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .map(to_domain)
            .transpose()
    }

    async fn find_tracked(&self) -> Result<Vec<CrawlJob>, RepositoryError> {
        let models = crawl_job_entity::Entity::find()
            .filter(crawl_job_entity::Column::Tracked.eq(true))
            .order_by_asc(crawl_job_entity::Column::StartTime)
            .all(self.db.as_ref())
            .await?;

        models.into_iter().map(to_domain).collect()
    }

    async fn update(&self, job: &CrawlJob) -> Result<(), RepositoryError> {
        let mut model: crawl_job_entity::ActiveModel = crawl_job_entity::Entity::find_by_id(job.id)
            .one(self.db.as_ref())
            .await?
            .ok_or(RepositoryError::NotFound)?
            .into();

        model.status = Set(job.status.to_string());
        model.start_time = Set(job.start_time.into());
        model.finish_time = Set(job.finish_time.map(Into::into));
        model.result_url = Set(job.result_url.clone());
        model.report_email = Set(job.report_email.clone());
        model.email_notification_sent = Set(job.email_notification_sent);

        model.update(self.db.as_ref()).await?;
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> Result<(), RepositoryError> {
        crawl_job_entity::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }

    async fn untrack(&self, id: Uuid) -> Result<(), RepositoryError> {
        crawl_job_entity::Entity::update_many()
            .col_expr(crawl_job_entity::Column::Tracked, Expr::value(false))
            .filter(crawl_job_entity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }
}
