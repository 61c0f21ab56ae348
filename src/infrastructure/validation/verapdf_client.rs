// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::validation::ValidationOutcome;
use crate::domain::services::validation_protocol::{
    RemoteStatus, RemoteValidationError, RemoteValidator,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// veraPDF 校验服务客户端
///
/// 服务以单个URL暴露整个协议：
/// `POST {url}/properties` 接收属性选择器，`POST {url}` 接收本地文件名，
/// `GET {url}` 的状态码表示进度，完成后同一地址返回JSON结果。
pub struct VeraPdfServiceClient {
    client: reqwest::Client,
    base_url: String,
}

impl VeraPdfServiceClient {
    /// 创建新的校验服务客户端
    ///
    /// # 参数
    ///
    /// * `base_url` - 校验服务地址
    /// * `timeout` - 单个请求超时
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn properties_url(&self) -> String {
        format!("{}/properties", self.base_url)
    }
}

/// 把状态码映射为协议状态
pub fn classify_status(code: u16) -> RemoteStatus {
    match code {
        200 => RemoteStatus::Done,
        102 => RemoteStatus::InProgress,
        100 => RemoteStatus::NeedsRetry,
        other => RemoteStatus::Unexpected(other),
    }
}

fn transport(err: reqwest::Error) -> RemoteValidationError {
    RemoteValidationError::Transport(err.to_string())
}

#[async_trait]
impl RemoteValidator for VeraPdfServiceClient {
    async fn send_settings(
        &self,
        settings: &BTreeMap<String, String>,
    ) -> Result<(), RemoteValidationError> {
        let response = self
            .client
            .post(self.properties_url())
            .json(settings)
            .send()
            .await
            .map_err(transport)?;
        debug!(
            "Validation settings sent ({} properties), service answered {}",
            settings.len(),
            response.status()
        );
        Ok(())
    }

    async fn send_request(&self, local_file: &Path) -> Result<(), RemoteValidationError> {
        let response = self
            .client
            .post(&self.base_url)
            .body(local_file.to_string_lossy().into_owned())
            .send()
            .await
            .map_err(transport)?;
        debug!(
            "Validation request for {} sent, service answered {}",
            local_file.display(),
            response.status()
        );
        Ok(())
    }

    async fn status(&self) -> Result<RemoteStatus, RemoteValidationError> {
        let response = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .map_err(transport)?;
        Ok(classify_status(response.status().as_u16()))
    }

    async fn fetch_result(&self) -> Result<ValidationOutcome, RemoteValidationError> {
        let response = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .map_err(transport)?;
        if response.status() != StatusCode::OK {
            return Err(RemoteValidationError::Protocol(format!(
                "result requested but service answered {}",
                response.status()
            )));
        }
        let body = response.bytes().await.map_err(transport)?;
        serde_json::from_slice(&body).map_err(|e| RemoteValidationError::Protocol(e.to_string()))
    }
}
