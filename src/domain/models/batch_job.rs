// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 批量爬取任务
///
/// 把多个独立跟踪的爬取任务归为一组。成员列表创建后只追加，
/// `finished` 只会从 false 变为 true。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchJob {
    /// 批量任务唯一标识符
    pub id: Uuid,
    /// 通知收件人，会传递给每个成员任务
    pub report_email: Option<String>,
    /// 规范化后的成员URL，按提交顺序排列
    pub member_urls: Vec<String>,
    /// 是否所有成员均已结束
    pub finished: bool,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl BatchJob {
    /// 创建空的批量任务
    pub fn new(report_email: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            report_email,
            member_urls: Vec::new(),
            finished: false,
            created_at: Utc::now(),
        }
    }

    /// 追加成员URL
    pub fn add_member(&mut self, crawl_url: String) {
        self.member_urls.push(crawl_url);
    }

    /// 标记为已完成，不可逆
    pub fn mark_finished(&mut self) {
        self.finished = true;
    }
}
