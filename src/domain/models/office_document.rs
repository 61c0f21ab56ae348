// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// 办公文档类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfficeDocumentKind {
    /// Microsoft Office 文档
    MicrosoftOffice,
    /// OpenDocument 文档
    Odf,
}

impl fmt::Display for OfficeDocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OfficeDocumentKind::MicrosoftOffice => write!(f, "microsoft_office"),
            OfficeDocumentKind::Odf => write!(f, "odf"),
        }
    }
}

/// 爬取过程中发现的办公文档元数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficeDocument {
    /// 文档URL
    pub file_url: String,
    /// 所属爬取任务
    pub job_id: Uuid,
    /// 文档类型
    pub kind: OfficeDocumentKind,
    /// 最后修改时间（引擎给出的原始文本）
    pub last_modified: Option<String>,
}
