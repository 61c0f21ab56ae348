// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

/// 连续传输失败达到该次数视为不健康
pub const UNHEALTHY_AFTER_FAILURES: u32 = 3;

/// 校验流水线健康状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

/// 健康报告
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub state: HealthState,
    pub worker_running: bool,
    pub consecutive_transport_failures: u32,
    pub last_error: Option<String>,
    pub last_success: Option<DateTime<Utc>>,
    pub processed: u64,
    pub failed: u64,
}

#[derive(Debug, Default)]
struct HealthInner {
    worker_running: bool,
    consecutive_transport_failures: u32,
    last_error: Option<String>,
    last_success: Option<DateTime<Utc>>,
    processed: u64,
    failed: u64,
}

/// 校验流水线健康信号
///
/// 工作器写入，健康检查接口读取。远程服务长时间不可达时，
/// 运维人员可以通过连续失败次数观察到卡住的流水线。
#[derive(Debug, Default)]
pub struct PipelineHealth {
    inner: RwLock<HealthInner>,
}

impl PipelineHealth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_running(&self, running: bool) {
        self.inner.write().worker_running = running;
    }

    /// 记录一次传输失败
    pub fn record_transport_failure(&self, message: &str) {
        let mut inner = self.inner.write();
        inner.consecutive_transport_failures += 1;
        inner.last_error = Some(message.to_string());
    }

    /// 远程服务恢复响应
    pub fn record_reachable(&self) {
        self.inner.write().consecutive_transport_failures = 0;
    }

    /// 记录一个任务处理完成
    pub fn record_processed(&self, succeeded: bool) {
        let mut inner = self.inner.write();
        inner.processed += 1;
        if succeeded {
            inner.last_success = Some(Utc::now());
        } else {
            inner.failed += 1;
        }
    }

    /// 记录队列错误
    pub fn record_queue_error(&self, message: &str) {
        self.inner.write().last_error = Some(message.to_string());
    }

    pub fn report(&self) -> HealthReport {
        let inner = self.inner.read();
        let state = if !inner.worker_running
            || inner.consecutive_transport_failures >= UNHEALTHY_AFTER_FAILURES
        {
            HealthState::Unhealthy
        } else if inner.consecutive_transport_failures > 0 {
            HealthState::Degraded
        } else {
            HealthState::Healthy
        };
        HealthReport {
            state,
            worker_running: inner.worker_running,
            consecutive_transport_failures: inner.consecutive_transport_failures,
            last_error: inner.last_error.clone(),
            last_success: inner.last_success,
            processed: inner.processed,
            failed: inner.failed,
        }
    }
}
