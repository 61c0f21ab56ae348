// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 已启动的爬取任务
pub const JOBS_STARTED: &str = "vericrawl_jobs_started_total";
/// 已发送的完成通知
pub const NOTIFICATIONS_SENT: &str = "vericrawl_notifications_sent_total";
/// 已处理的校验任务，按结果区分
pub const VALIDATION_TASKS: &str = "vericrawl_validation_tasks_total";
/// 远程状态轮询次数
pub const PROTOCOL_POLLS: &str = "vericrawl_validation_polls_total";
/// 传输失败后的重试次数
pub const TRANSPORT_RETRIES: &str = "vericrawl_validation_transport_retries_total";
/// 单个校验任务耗时
pub const VALIDATION_DURATION: &str = "vericrawl_validation_duration_seconds";
/// 校验队列长度
pub const QUEUE_DEPTH: &str = "vericrawl_validation_queue_depth";

/// 启动 Prometheus 导出器
pub fn init_metrics(listen_address: &str) {
    let addr: SocketAddr = match listen_address.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics address '{}': {}", listen_address, e);
            return;
        }
    };

    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!(
            "Failed to install Prometheus recorder: {}. This might happen if the port is already in use.",
            e
        );
        return;
    }

    info!("Metrics exporter listening on {}", addr);
}
