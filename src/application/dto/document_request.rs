// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::office_document::{OfficeDocument, OfficeDocumentKind};
use crate::domain::models::validation::ValidationTask;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;
use validator::Validate;

/// 提交校验任务请求
///
/// 由爬取引擎在发现PDF文档时调用
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ValidationTaskDto {
    #[validate(url)]
    pub uri: String,
    #[validate(length(min = 1))]
    pub filepath: String,
    #[serde(alias = "job_directory")]
    #[validate(length(min = 1))]
    pub job_directory: String,
    #[serde(default)]
    pub time: String,
}

impl From<ValidationTaskDto> for ValidationTask {
    fn from(dto: ValidationTaskDto) -> Self {
        ValidationTask {
            source_uri: dto.uri,
            local_file_path: PathBuf::from(dto.filepath),
            output_directory: dto.job_directory,
            observed_timestamp: dto.time,
        }
    }
}

/// 提交办公文档元数据请求
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OfficeFileDto {
    #[serde(alias = "file_url")]
    #[validate(length(min = 1, max = 2048))]
    pub file_url: String,
    #[serde(alias = "job_id")]
    pub job_id: Uuid,
    #[serde(default, alias = "last_modified")]
    pub last_modified: Option<String>,
}

impl OfficeFileDto {
    pub fn into_document(self, kind: OfficeDocumentKind) -> OfficeDocument {
        OfficeDocument {
            file_url: self.file_url,
            job_id: self.job_id,
            kind,
            last_modified: self.last_modified,
        }
    }
}
