// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::gauge;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::models::validation::ValidationTask;
use crate::domain::services::job_registry::JobRegistry;
use crate::infrastructure::metrics::QUEUE_DEPTH;

/// 队列错误类型
///
/// 快照无法写入意味着持久化保证已被破坏，调用方必须处理
#[derive(Error, Debug)]
pub enum QueueError {
    /// IO错误
    #[error("Queue snapshot IO error: {0}")]
    Io(#[from] std::io::Error),
    /// 序列化错误
    #[error("Queue snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// 快照内容损坏
    #[error("Corrupt queue snapshot at line {line}: {reason}")]
    Corrupt {
        /// 行号，从1开始
        line: usize,
        /// 原因
        reason: String,
    },
}

/// 持久化的校验任务队列
///
/// 先进先出，单一消费者。每次入队或出队都把完整队列写入快照：
/// 先写临时文件并落盘，再原子替换快照文件，因此崩溃后重新加载的
/// 内容总是某一次完整写入的结果。修改与写快照在同一把锁内完成。
pub struct ValidationQueue {
    tasks: Mutex<VecDeque<ValidationTask>>,
    snapshot_path: PathBuf,
}

impl ValidationQueue {
    /// 创建空队列
    pub fn new(snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            tasks: Mutex::new(VecDeque::new()),
            snapshot_path: snapshot_path.into(),
        }
    }

    /// 从快照加载队列
    ///
    /// 快照不存在时返回空队列。每个任务的所属爬取任务会在注册表中重新解析，
    /// 解析不到的任务仍然保留，处理时按孤立任务记录。
    pub async fn load(
        snapshot_path: impl Into<PathBuf>,
        registry: &JobRegistry,
    ) -> Result<Self, QueueError> {
        let snapshot_path = snapshot_path.into();
        let content = match tokio::fs::read_to_string(&snapshot_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No queue snapshot at {}", snapshot_path.display());
                String::new()
            }
            Err(e) => return Err(e.into()),
        };

        let tasks = parse_snapshot(&content)?;
        for task in &tasks {
            let resolved = task
                .owner_job_id()
                .map(|id| registry.contains(id))
                .unwrap_or(false);
            if !resolved {
                warn!(
                    "Reloaded validation task {} has no tracked crawl job ({})",
                    task.source_uri, task.output_directory
                );
            }
        }

        info!(
            "Loaded {} pending validation task(s) from {}",
            tasks.len(),
            snapshot_path.display()
        );
        gauge!(QUEUE_DEPTH).set(tasks.len() as f64);
        Ok(Self {
            tasks: Mutex::new(tasks),
            snapshot_path,
        })
    }

    /// 任务入队
    ///
    /// 返回入队后的队列长度。快照写入失败时撤销本次入队。
    pub async fn enqueue(&self, task: ValidationTask) -> Result<usize, QueueError> {
        let mut tasks = self.tasks.lock().await;
        debug!("Enqueuing validation task {}", task.source_uri);
        tasks.push_back(task);
        if let Err(e) = self.persist(&tasks).await {
            tasks.pop_back();
            return Err(e);
        }
        gauge!(QUEUE_DEPTH).set(tasks.len() as f64);
        Ok(tasks.len())
    }

    /// 取出队首任务
    ///
    /// 快照写入失败时任务放回队首
    pub async fn dequeue(&self) -> Result<Option<ValidationTask>, QueueError> {
        let mut tasks = self.tasks.lock().await;
        let Some(task) = tasks.pop_front() else {
            return Ok(None);
        };
        if let Err(e) = self.persist(&tasks).await {
            tasks.push_front(task);
            return Err(e);
        }
        gauge!(QUEUE_DEPTH).set(tasks.len() as f64);
        Ok(Some(task))
    }

    /// 把未完成的任务放回队首
    pub async fn push_front(&self, task: ValidationTask) -> Result<(), QueueError> {
        let mut tasks = self.tasks.lock().await;
        tasks.push_front(task);
        if let Err(e) = self.persist(&tasks).await {
            tasks.pop_front();
            return Err(e);
        }
        gauge!(QUEUE_DEPTH).set(tasks.len() as f64);
        Ok(())
    }

    /// 队列长度
    pub async fn len(&self) -> usize {
        self.tasks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.lock().await.is_empty()
    }

    /// 当前队列内容的副本
    pub async fn snapshot(&self) -> Vec<ValidationTask> {
        self.tasks.lock().await.iter().cloned().collect()
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    async fn persist(&self, tasks: &VecDeque<ValidationTask>) -> Result<(), QueueError> {
        let mut content = String::new();
        for task in tasks {
            content.push_str(&serde_json::to_string(task)?);
            content.push('\n');
        }

        if let Some(parent) = self.snapshot_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp_path = temp_path(&self.snapshot_path);
        let mut file = tokio::fs::File::create(&tmp_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp_path, &self.snapshot_path).await?;
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn parse_snapshot(content: &str) -> Result<VecDeque<ValidationTask>, QueueError> {
    let mut tasks = VecDeque::new();
    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let task = serde_json::from_str(line).map_err(|e| QueueError::Corrupt {
            line: index + 1,
            reason: e.to_string(),
        })?;
        tasks.push_back(task);
    }
    Ok(tasks)
}

#[cfg(test)]
#[path = "validation_queue_test.rs"]
mod tests;
