// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::models::validation::InvalidReportEntry;
use crate::domain::repositories::report_storage::{
    ReportError, ReportStorage, INVALID_REPORT_FILE, VALID_REPORT_FILE,
};

/// 本地文件系统报告存储
///
/// 报告文件位于每个任务的输出目录中，只追加写入
#[derive(Debug, Default)]
pub struct LocalReportStorage {
    /// 输出目录为相对路径时使用的根目录
    base_path: Option<PathBuf>,
}

impl LocalReportStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: Some(base_path.into()),
        }
    }

    fn report_path(&self, output_directory: &str, file_name: &str) -> PathBuf {
        let dir = Path::new(output_directory);
        match &self.base_path {
            Some(base) if dir.is_relative() => base.join(dir).join(file_name),
            _ => dir.join(file_name),
        }
    }

    async fn append_line(&self, path: &Path, line: &str) -> Result<(), ReportError> {
        // 确保目录存在
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(format!("{}\n", line).as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl ReportStorage for LocalReportStorage {
    async fn append_valid(
        &self,
        output_directory: &str,
        document_url: &str,
        observed_timestamp: &str,
    ) -> Result<(), ReportError> {
        let path = self.report_path(output_directory, VALID_REPORT_FILE);
        self.append_line(&path, &valid_line(document_url, observed_timestamp))
            .await
    }

    async fn append_invalid(
        &self,
        output_directory: &str,
        entry: &InvalidReportEntry,
    ) -> Result<(), ReportError> {
        let path = self.report_path(output_directory, INVALID_REPORT_FILE);
        self.append_line(&path, &serde_json::to_string(entry)?).await
    }
}

/// 内存报告存储，按 `输出目录/文件名` 保存行
#[derive(Debug, Default)]
pub struct InMemoryReportStorage {
    files: Mutex<HashMap<String, Vec<String>>>,
}

impl InMemoryReportStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取某个报告文件的全部行
    pub fn lines(&self, output_directory: &str, file_name: &str) -> Vec<String> {
        self.files
            .lock()
            .get(&key(output_directory, file_name))
            .cloned()
            .unwrap_or_default()
    }

    fn push(&self, output_directory: &str, file_name: &str, line: String) {
        self.files
            .lock()
            .entry(key(output_directory, file_name))
            .or_default()
            .push(line);
    }
}

#[async_trait]
impl ReportStorage for InMemoryReportStorage {
    async fn append_valid(
        &self,
        output_directory: &str,
        document_url: &str,
        observed_timestamp: &str,
    ) -> Result<(), ReportError> {
        self.push(
            output_directory,
            VALID_REPORT_FILE,
            valid_line(document_url, observed_timestamp),
        );
        Ok(())
    }

    async fn append_invalid(
        &self,
        output_directory: &str,
        entry: &InvalidReportEntry,
    ) -> Result<(), ReportError> {
        let line = serde_json::to_string(entry)?;
        self.push(output_directory, INVALID_REPORT_FILE, line);
        Ok(())
    }
}

fn key(output_directory: &str, file_name: &str) -> String {
    format!("{}/{}", output_directory.trim_end_matches('/'), file_name)
}

fn valid_line(document_url: &str, observed_timestamp: &str) -> String {
    format!("{}, {}", document_url, observed_timestamp)
}
