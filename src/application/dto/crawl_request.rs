// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::lifecycle_service::StartJobRequest;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 计划日期格式（日-月-年）
pub const SCHEDULED_DATE_FORMAT: &str = "%d-%m-%Y";

/// 解析计划日期，空字符串视为未设置
pub fn parse_scheduled_date(date: Option<&str>) -> Result<Option<NaiveDate>, String> {
    match date.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => NaiveDate::parse_from_str(text, SCHEDULED_DATE_FORMAT)
            .map(Some)
            .map_err(|_| format!("date '{}' must be formatted as dd-MM-yyyy", text)),
    }
}

/// 启动爬取任务请求
#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartJobRequestDto {
    #[validate(length(min = 1, max = 2048))]
    pub domain: String,
    pub date: Option<String>,
    #[serde(default, alias = "report_email")]
    #[validate(email)]
    pub report_email: Option<String>,
    #[serde(default, alias = "force_start")]
    pub force_start: bool,
}

impl StartJobRequestDto {
    /// 转换为领域请求
    pub fn into_request(self) -> Result<StartJobRequest, String> {
        Ok(StartJobRequest {
            scheduled_date: parse_scheduled_date(self.date.as_deref())?,
            domain: self.domain,
            report_email: self.report_email,
            force_start: self.force_start,
        })
    }
}

/// 设置通知收件人请求
#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmailAddressDto {
    pub job: Uuid,
    #[serde(alias = "email_address")]
    #[validate(email)]
    pub email_address: String,
}
