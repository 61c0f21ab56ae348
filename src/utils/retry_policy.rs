// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

/// 重试策略配置
///
/// 用于远程校验服务不可达时的外层重试。`max_retries` 为 `None`
/// 表示不限次数，此时只能通过关闭信号结束重试。
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// 最大重试次数
    pub max_retries: Option<u32>,
    /// 两次重试之间的等待时间
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::transport(Duration::from_secs(60), None)
    }
}

impl RetryPolicy {
    /// 传输失败重试策略：固定间隔
    pub fn transport(interval: Duration, max_retries: Option<u32>) -> Self {
        Self {
            max_retries,
            interval,
        }
    }

    /// 计算第 `attempt` 次重试（从1开始）前的退避时间
    pub fn calculate_backoff(&self, _attempt: u32) -> Duration {
        self.interval
    }

    /// 已经重试 `attempt` 次后是否还应该继续重试
    pub fn should_retry(&self, attempt: u32) -> bool {
        match self.max_retries {
            Some(max) => attempt < max,
            None => true,
        }
    }

    /// 是否不限重试次数
    pub fn is_unbounded(&self) -> bool {
        self.max_retries.is_none()
    }
}
