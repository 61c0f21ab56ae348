// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use super::ledger::ErrorLedger;

/// 爬取任务实体
///
/// 表示一个正在被跟踪的单URL爬取任务。`finish_time` 与 `result_url`
/// 只写一次，`email_notification_sent` 只会从 false 变为 true。
/// 重启任务是唯一的例外：三者都会被清空，以便重新检测完成。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlJob {
    /// 爬取任务唯一标识符，同时作为爬取引擎中的任务名
    pub id: Uuid,
    /// 规范化后的爬取URL，在被跟踪的任务中唯一
    pub crawl_url: String,
    /// 任务状态
    pub status: CrawlJobStatus,
    /// 计划日期，仅供参考
    pub scheduled_date: Option<NaiveDate>,
    /// 开始时间，创建时设置，重启时重置
    pub start_time: DateTime<Utc>,
    /// 完成时间，首次观察到终止状态时设置
    pub finish_time: Option<DateTime<Utc>>,
    /// 结果地址，首次观察到终止状态时设置，此前为空
    pub result_url: String,
    /// 通知收件人
    pub report_email: Option<String>,
    /// 是否已发送完成通知
    pub email_notification_sent: bool,
    /// 错误统计账本，与该任务的校验任务共享
    #[serde(skip)]
    pub ledger: Arc<ErrorLedger>,
}

impl CrawlJob {
    /// 创建新的爬取任务，状态为 `Created`
    pub fn new(
        crawl_url: impl Into<String>,
        scheduled_date: Option<NaiveDate>,
        report_email: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            crawl_url: crawl_url.into(),
            status: CrawlJobStatus::Created,
            scheduled_date,
            start_time: Utc::now(),
            finish_time: None,
            result_url: String::new(),
            report_email: report_email.filter(|e| !e.trim().is_empty()),
            email_notification_sent: false,
            ledger: Arc::new(ErrorLedger::default()),
        }
    }

    /// 是否已记录完成信息
    pub fn is_finalized(&self) -> bool {
        self.finish_time.is_some()
    }

    /// 记录引擎报告的终止状态
    ///
    /// 只在第一次调用时生效，返回是否实际写入
    pub fn record_finish(
        &mut self,
        status: CrawlJobStatus,
        result_url: String,
        finished_at: DateTime<Utc>,
    ) -> bool {
        if self.finish_time.is_some() {
            return false;
        }
        self.status = status;
        self.result_url = result_url;
        self.finish_time = Some(finished_at);
        true
    }

    /// 领取完成通知
    ///
    /// 设置了收件人且尚未发送时返回收件人，并立即把标志置为已发送
    pub fn claim_notification(&mut self) -> Option<String> {
        if self.email_notification_sent {
            return None;
        }
        let recipient = self.report_email.clone()?;
        self.email_notification_sent = true;
        Some(recipient)
    }

    /// 为重启重置任务状态
    ///
    /// 重置开始时间，清空完成时间、结果地址、账本与通知标志
    pub fn reset_for_restart(&mut self, now: DateTime<Utc>) {
        self.start_time = now;
        self.finish_time = None;
        self.result_url.clear();
        self.email_notification_sent = false;
        self.status = CrawlJobStatus::Running;
        self.ledger.clear();
    }
}

/// 爬取任务状态
///
/// Created → Running ⇄ Paused → Finished/Aborted/Terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CrawlJobStatus {
    /// 已创建，引擎尚未启动
    #[default]
    Created,
    /// 运行中
    Running,
    /// 已暂停
    Paused,
    /// 已完成
    Finished,
    /// 已中止
    Aborted,
    /// 已被操作员终止
    Terminated,
}

impl CrawlJobStatus {
    /// 是否为引擎报告的终止状态
    pub fn is_terminal(&self) -> bool {
        matches!(self, CrawlJobStatus::Finished | CrawlJobStatus::Aborted)
    }

    /// 是否仍由引擎驱动（可暂停、终止或删除）
    pub fn is_active(&self) -> bool {
        matches!(self, CrawlJobStatus::Running | CrawlJobStatus::Paused)
    }

    /// 解析爬取引擎返回的状态文本
    ///
    /// 引擎文本不区分大小写，例如 `RUNNING`、`PAUSED`、
    /// `FINISHED`、`Finished: ABORTED`。无法识别时返回 `None`。
    pub fn from_engine_status(text: &str) -> Option<Self> {
        let lower = text.trim().to_lowercase();
        if lower.contains("aborted") {
            Some(CrawlJobStatus::Aborted)
        } else if lower.starts_with("finished") {
            Some(CrawlJobStatus::Finished)
        } else if lower.starts_with("paus") {
            Some(CrawlJobStatus::Paused)
        } else if lower.starts_with("running")
            || lower.starts_with("preparing")
            || lower.starts_with("stopping")
            || lower.starts_with("empty")
        {
            Some(CrawlJobStatus::Running)
        } else if lower.starts_with("unbuilt")
            || lower.starts_with("ready")
            || lower.starts_with("nascent")
        {
            Some(CrawlJobStatus::Created)
        } else {
            None
        }
    }
}

impl fmt::Display for CrawlJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CrawlJobStatus::Created => write!(f, "created"),
            CrawlJobStatus::Running => write!(f, "running"),
            CrawlJobStatus::Paused => write!(f, "paused"),
            CrawlJobStatus::Finished => write!(f, "finished"),
            CrawlJobStatus::Aborted => write!(f, "aborted"),
            CrawlJobStatus::Terminated => write!(f, "terminated"),
        }
    }
}

impl FromStr for CrawlJobStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(CrawlJobStatus::Created),
            "running" => Ok(CrawlJobStatus::Running),
            "paused" => Ok(CrawlJobStatus::Paused),
            "finished" => Ok(CrawlJobStatus::Finished),
            "aborted" => Ok(CrawlJobStatus::Aborted),
            "terminated" => Ok(CrawlJobStatus::Terminated),
            _ => Err(()),
        }
    }
}
