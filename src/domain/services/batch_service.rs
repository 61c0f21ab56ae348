// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::NaiveDate;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::models::batch_job::BatchJob;
use crate::domain::services::lifecycle_service::{CrawlLifecycleManager, JobReport, StartJobRequest};
use crate::utils::url_utils::normalize_crawl_url;

/// 批量任务报告
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// 批量任务ID
    pub id: Uuid,
    /// 通知收件人
    pub report_email: Option<String>,
    /// 是否所有成员均已结束
    pub finished: bool,
    /// 可解析的成员报告
    pub jobs: Vec<JobReport>,
    /// 无法解析的成员URL
    pub unresolved: Vec<String>,
}

/// 批量任务聚合服务
///
/// 为每个成员URL独立启动爬取任务，查询时逐个重新读取成员状态
pub struct BatchService {
    lifecycle: Arc<CrawlLifecycleManager>,
}

impl BatchService {
    pub fn new(lifecycle: Arc<CrawlLifecycleManager>) -> Self {
        Self { lifecycle }
    }

    /// 启动批量任务
    ///
    /// 单个成员启动失败不会中止整个批量任务
    pub async fn start_batch(
        &self,
        domains: &[String],
        report_email: Option<String>,
        scheduled_date: Option<NaiveDate>,
    ) -> BatchReport {
        let report_email = report_email.filter(|e| !e.trim().is_empty());
        let mut batch = BatchJob::new(report_email.clone());
        let mut jobs = Vec::with_capacity(domains.len());

        for domain in domains {
            let report = self
                .lifecycle
                .start(StartJobRequest {
                    domain: domain.clone(),
                    scheduled_date,
                    report_email: report_email.clone(),
                    force_start: false,
                })
                .await;
            if report.id.is_none() {
                warn!("Batch {} member {} failed to start", batch.id, domain);
            }
            batch.add_member(normalize_crawl_url(domain));
            jobs.push(report);
        }

        info!(
            "Started batch {} with {} member(s)",
            batch.id,
            batch.member_urls.len()
        );
        let report = BatchReport {
            id: batch.id,
            report_email,
            finished: false,
            jobs,
            unresolved: Vec::new(),
        };
        self.lifecycle.registry().insert_batch(batch);
        report
    }

    /// 查询批量任务
    ///
    /// 每次调用都重新查询所有成员。所有可解析成员都已结束时把 `finished`
    /// 置为 true，此后不再回退。
    pub async fn get_batch(&self, id: Uuid) -> Option<BatchReport> {
        let batch = self.lifecycle.registry().get_batch(id)?;

        // join_all keeps member order
        let reports = join_all(batch.member_urls.iter().map(|url| async move {
            match self.lifecycle.registry().find_by_url(url) {
                Some(job) => self.lifecycle.get_job(job.id).await,
                None => None,
            }
        }))
        .await;

        let mut jobs = Vec::new();
        let mut unresolved = Vec::new();
        for (url, report) in batch.member_urls.iter().zip(reports) {
            match report {
                Some(report) => jobs.push(report),
                None => unresolved.push(url.clone()),
            }
        }

        let all_terminal = jobs.iter().all(|job| job.status.is_terminal());
        let finished = if all_terminal && !batch.finished {
            info!("Batch {} finished", id);
            self.lifecycle
                .registry()
                .update_batch(id, |batch| {
                    batch.mark_finished();
                    batch.finished
                })
                .unwrap_or(true)
        } else {
            batch.finished
        };

        Some(BatchReport {
            id,
            report_email: batch.report_email,
            finished,
            jobs,
            unresolved,
        })
    }
}

#[cfg(test)]
#[path = "batch_service_test.rs"]
mod tests;
