// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::workers::worker::Worker;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// 工作管理器
///
/// 启动后台工作器并在关闭时通知它们在下一个等待点退出
pub struct WorkerManager {
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<(String, JoinHandle<()>)>,
}

impl Default for WorkerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerManager {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            shutdown_tx,
            handles: Vec::new(),
        }
    }

    /// 启动工作器
    ///
    /// # 参数
    ///
    /// * `worker` - 要启动的工作器
    pub fn start_worker(&mut self, worker: Arc<dyn Worker>) {
        let name = worker.name().to_string();
        let shutdown = self.shutdown_tx.subscribe();
        let task_name = name.clone();
        let handle = tokio::spawn(async move {
            info!("Worker {} started", task_name);
            match worker.run(shutdown).await {
                Ok(()) => info!("Worker {} stopped", task_name),
                Err(e) => error!("Worker {} failed: {}", task_name, e),
            }
        });
        self.handles.push((name, handle));
    }

    /// 发送关闭信号并等待所有工作器退出
    pub async fn shutdown(&mut self) {
        info!("Shutting down workers...");
        let _ = self.shutdown_tx.send(true);
        for (name, handle) in self.handles.drain(..) {
            if let Err(e) = handle.await {
                error!("Worker {} panicked: {}", name, e);
            }
        }
        info!("Workers shut down successfully");
    }
}
