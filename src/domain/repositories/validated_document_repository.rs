// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::RepositoryError;
use crate::domain::models::validation::RuleViolation;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// 校验文档仓库特质
///
/// 按文档来源URI记录校验错误、提取的属性和处理错误，
/// 并提供发送给校验服务的属性选择器配置
#[async_trait]
pub trait ValidatedDocumentRepository: Send + Sync {
    /// 记录一条校验错误
    async fn add_error(
        &self,
        document_url: &str,
        error: &RuleViolation,
    ) -> Result<(), RepositoryError>;

    /// 记录一个提取到的属性
    async fn add_property(
        &self,
        document_url: &str,
        name: &str,
        value: &str,
    ) -> Result<(), RepositoryError>;

    /// 记录一条处理错误
    async fn add_processing_error(
        &self,
        document_url: &str,
        message: &str,
    ) -> Result<(), RepositoryError>;

    /// 获取属性名到XPath选择器的映射
    async fn pdf_properties_with_xpath(&self) -> Result<BTreeMap<String, String>, RepositoryError>;
}
