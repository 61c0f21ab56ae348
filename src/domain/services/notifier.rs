// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

/// 通知错误类型
#[derive(Error, Debug)]
pub enum NotifierError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 中继拒绝了消息
    #[error("Relay rejected message with status {0}")]
    Rejected(u16),
    /// 配置错误
    #[error("Notifier misconfigured: {0}")]
    Misconfigured(String),
}

/// 通知服务特质
///
/// 尽力而为地发送一封通知邮件，调用方只记录失败
#[async_trait]
pub trait Notifier: Send + Sync {
    /// 发送通知
    ///
    /// # 参数
    ///
    /// * `recipient` - 收件人
    /// * `subject` - 主题
    /// * `body` - 正文
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 发送成功
    /// * `Err(NotifierError)` - 发送失败
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifierError>;
}
