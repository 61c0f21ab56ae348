// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 启动批量任务请求
#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartBatchRequestDto {
    #[validate(length(min = 1, max = 1000))]
    pub domains: Vec<String>,
    pub date: Option<String>,
    #[serde(default, alias = "report_email")]
    #[validate(email)]
    pub report_email: Option<String>,
}
