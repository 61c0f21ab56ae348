// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::validation::InvalidReportEntry;
use async_trait::async_trait;
use thiserror::Error;

/// 合格文档报告文件名
pub const VALID_REPORT_FILE: &str = "Valid_PDF_Report.txt";
/// 不合格文档报告文件名
pub const INVALID_REPORT_FILE: &str = "Invalid_PDF_Report.txt";

/// 报告存储错误类型
#[derive(Error, Debug)]
pub enum ReportError {
    /// IO错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 报告存储特质
///
/// 每个任务的报告文件只追加，已写入的行不会被修改
#[async_trait]
pub trait ReportStorage: Send + Sync {
    /// 追加一条合格文档记录
    async fn append_valid(
        &self,
        output_directory: &str,
        document_url: &str,
        observed_timestamp: &str,
    ) -> Result<(), ReportError>;

    /// 追加一条不合格文档记录
    async fn append_invalid(
        &self,
        output_directory: &str,
        entry: &InvalidReportEntry,
    ) -> Result<(), ReportError>;
}
