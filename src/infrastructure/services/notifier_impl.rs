// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::NotificationSettings;
use crate::domain::services::notifier::{Notifier, NotifierError};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

type HmacSha256 = Hmac<Sha256>;

/// 发往邮件中继的消息体
#[derive(Debug, Serialize)]
struct RelayMessage<'a> {
    to: &'a str,
    from: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// 通过HTTP邮件中继发送通知
///
/// 设置了密钥时，请求体的HMAC-SHA256签名放在 `X-Vericrawl-Signature` 头中
pub struct HttpMailRelayNotifier {
    client: reqwest::Client,
    relay_url: String,
    sender: String,
    secret: Option<String>,
}

impl HttpMailRelayNotifier {
    /// 创建新的邮件中继通知器
    pub fn new(
        relay_url: impl Into<String>,
        sender: impl Into<String>,
        secret: Option<String>,
    ) -> Result<Self, NotifierError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            relay_url: relay_url.into(),
            sender: sender.into(),
            secret,
        })
    }

    /// 为负载生成签名
    fn generate_signature(secret: &str, payload: &[u8]) -> Result<String, NotifierError> {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| NotifierError::Misconfigured(e.to_string()))?;
        mac.update(payload);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

#[async_trait]
impl Notifier for HttpMailRelayNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifierError> {
        let message = RelayMessage {
            to: recipient,
            from: &self.sender,
            subject,
            body,
        };
        let payload = serde_json::to_vec(&message)
            .map_err(|e| NotifierError::Misconfigured(e.to_string()))?;

        let mut request = self
            .client
            .post(&self.relay_url)
            .header("Content-Type", "application/json");
        if let Some(secret) = &self.secret {
            request = request.header(
                "X-Vericrawl-Signature",
                Self::generate_signature(secret, &payload)?,
            );
        }

        let response = request.body(payload).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(NotifierError::Rejected(response.status().as_u16()))
        }
    }
}

/// 只写日志的通知器，未配置中继时使用
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifierError> {
        info!("Notification to {} [{}]: {}", recipient, subject, body);
        Ok(())
    }
}

/// 根据配置选择通知器
pub fn build_notifier(settings: &NotificationSettings) -> Result<Arc<dyn Notifier>, NotifierError> {
    match (&settings.enabled, &settings.relay_url) {
        (true, Some(url)) => Ok(Arc::new(HttpMailRelayNotifier::new(
            url.clone(),
            settings.sender.clone(),
            settings.secret.clone(),
        )?)),
        (true, None) => Err(NotifierError::Misconfigured(
            "notification.relay_url is required when notifications are enabled".to_string(),
        )),
        (false, _) => Ok(Arc::new(LoggingNotifier)),
    }
}
