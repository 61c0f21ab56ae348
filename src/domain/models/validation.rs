// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use uuid::Uuid;

/// 校验任务
///
/// 队列中等待远程PDF校验的一个文档。任务只保存所属爬取任务的ID
/// （从输出目录中解析），处理时再到任务注册表中查找对应账本。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationTask {
    /// 文档来源URI
    pub source_uri: String,
    /// 本地临时文件，处理后无论结果如何都会删除
    pub local_file_path: PathBuf,
    /// 输出目录，倒数第三个路径段为所属任务ID
    pub output_directory: String,
    /// 文档被发现时的时间戳（引擎给出的原始文本）
    pub observed_timestamp: String,
}

impl ValidationTask {
    /// 解析所属爬取任务ID
    ///
    /// 输出目录形如 `<jobs>/<job_id>/<launch>/mirror`
    pub fn owner_job_id(&self) -> Option<Uuid> {
        let segments: Vec<&str> = self
            .output_directory
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        if segments.len() < 3 {
            return None;
        }
        Uuid::parse_str(segments[segments.len() - 3]).ok()
    }
}

/// 单条校验错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleViolation {
    /// 规则标识
    #[serde(alias = "rule", alias = "clause")]
    pub rule_id: String,
    /// 错误描述
    #[serde(default, alias = "description")]
    pub message: String,
}

/// 校验结果
///
/// 每个任务只写入报告一次，之后不再修改
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    /// 是否通过校验
    #[serde(rename = "valid")]
    pub is_valid: bool,
    /// 校验错误列表
    #[serde(default, rename = "validationErrors")]
    pub errors: Vec<RuleViolation>,
    /// 提取到的文档属性
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    /// 非校验类的处理错误
    #[serde(default)]
    pub processing_error: Option<String>,
}

impl ValidationOutcome {
    /// 构造一个处理失败的结果，视为不合格
    pub fn processing_failure(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            errors: Vec::new(),
            properties: BTreeMap::new(),
            processing_error: Some(message.into()),
        }
    }

    /// 按规则统计错误出现次数
    pub fn error_counts(&self) -> HashMap<String, u64> {
        let mut counts = HashMap::new();
        for error in &self.errors {
            *counts.entry(error.rule_id.clone()).or_insert(0) += 1;
        }
        counts
    }
}

/// 不合格报告中的一行
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidReportEntry {
    /// 文档URL
    pub url: String,
    /// 文档时间戳
    pub last_modified: String,
    /// 校验结果
    #[serde(flatten)]
    pub outcome: ValidationOutcome,
}
