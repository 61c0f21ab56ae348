// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use metrics::counter;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::models::validation::{ValidationOutcome, ValidationTask};
use crate::infrastructure::metrics::PROTOCOL_POLLS;
use crate::utils::shutdown::sleep_or_shutdown;

/// 远程校验服务报告的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStatus {
    /// 校验进行中
    InProgress,
    /// 校验完成，可以获取结果
    Done,
    /// 服务要求重新提交
    NeedsRetry,
    /// 其他状态码
    Unexpected(u16),
}

/// 远程校验调用错误
#[derive(Error, Debug)]
pub enum RemoteValidationError {
    /// 服务不可达或连接中断
    #[error("Transport error: {0}")]
    Transport(String),
    /// 服务返回了无法理解的内容
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// 远程校验服务特质
#[async_trait]
pub trait RemoteValidator: Send + Sync {
    /// 发送属性选择器配置
    async fn send_settings(
        &self,
        settings: &BTreeMap<String, String>,
    ) -> Result<(), RemoteValidationError>;

    /// 提交校验请求
    async fn send_request(&self, local_file: &Path) -> Result<(), RemoteValidationError>;

    /// 查询当前状态
    async fn status(&self) -> Result<RemoteStatus, RemoteValidationError>;

    /// 获取校验结果
    async fn fetch_result(&self) -> Result<ValidationOutcome, RemoteValidationError>;
}

/// 协议参数
#[derive(Debug, Clone)]
pub struct ProtocolConfig {
    /// 每轮最多轮询次数
    pub max_polls: u32,
    /// 轮询间隔
    pub poll_interval: Duration,
    /// 服务要求重试时最多重发次数
    pub max_retries: u32,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            max_polls: 30,
            poll_interval: Duration::from_secs(10),
            max_retries: 2,
        }
    }
}

/// 协议错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// 传输错误，由外层按重试策略处理
    #[error("Validation service unreachable: {0}")]
    Transport(String),
    /// 轮询次数耗尽
    #[error("Validation timed out after {polls} status polls")]
    Timeout {
        /// 已轮询次数
        polls: u32,
    },
    /// 重试次数耗尽
    #[error("Validation service requested a retry more than {retries} times")]
    RetriesExhausted {
        /// 允许的重试次数
        retries: u32,
    },
    /// 意外的状态码
    #[error("Unexpected validation service status {0}")]
    UnexpectedStatus(u16),
    /// 服务返回内容无法解析
    #[error("Invalid validation service response: {0}")]
    Remote(String),
    /// 收到关闭信号
    #[error("Validation cancelled by shutdown")]
    Cancelled,
}

impl ProtocolError {
    /// 是否为传输错误
    pub fn is_transport(&self) -> bool {
        matches!(self, ProtocolError::Transport(_))
    }
}

impl From<RemoteValidationError> for ProtocolError {
    fn from(err: RemoteValidationError) -> Self {
        match err {
            RemoteValidationError::Transport(msg) => ProtocolError::Transport(msg),
            RemoteValidationError::Protocol(msg) => ProtocolError::Remote(msg),
        }
    }
}

/// 单个校验任务的远程协议
///
/// 发送配置与请求后轮询状态。完成时获取结果；进行中时等待后继续；
/// 要求重试时重发配置与请求并重新开始计数，超过重试上限即失败；
/// 其他状态立即失败；轮询次数耗尽视为超时。
pub struct ValidationProtocol {
    validator: Arc<dyn RemoteValidator>,
    config: ProtocolConfig,
}

impl ValidationProtocol {
    pub fn new(validator: Arc<dyn RemoteValidator>, config: ProtocolConfig) -> Self {
        Self { validator, config }
    }

    /// 执行一次完整的校验尝试
    ///
    /// # 参数
    ///
    /// * `settings` - 属性名到选择器的映射
    /// * `task` - 校验任务
    /// * `shutdown` - 关闭信号，在每次等待时检查
    ///
    /// # 返回值
    ///
    /// * `Ok(ValidationOutcome)` - 校验结果
    /// * `Err(ProtocolError)` - 传输错误、协议错误或被取消
    pub async fn run(
        &self,
        settings: &BTreeMap<String, String>,
        task: &ValidationTask,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<ValidationOutcome, ProtocolError> {
        let mut retries = 0u32;

        'attempt: loop {
            self.validator.send_settings(settings).await?;
            self.validator.send_request(&task.local_file_path).await?;
            debug!(
                "Submitted {} for validation (retry {})",
                task.source_uri, retries
            );

            for poll in 1..=self.config.max_polls {
                counter!(PROTOCOL_POLLS).increment(1);
                match self.validator.status().await? {
                    RemoteStatus::Done => {
                        let outcome = self.validator.fetch_result().await?;
                        info!(
                            "Validated {} after {} polls: valid={}",
                            task.source_uri, poll, outcome.is_valid
                        );
                        return Ok(outcome);
                    }
                    RemoteStatus::InProgress => {
                        if sleep_or_shutdown(self.config.poll_interval, shutdown).await {
                            return Err(ProtocolError::Cancelled);
                        }
                    }
                    RemoteStatus::NeedsRetry => {
                        retries += 1;
                        if retries > self.config.max_retries {
                            warn!(
                                "Validation service kept requesting retries for {}",
                                task.source_uri
                            );
                            return Err(ProtocolError::RetriesExhausted {
                                retries: self.config.max_retries,
                            });
                        }
                        debug!("Validation service requested retry {}", retries);
                        continue 'attempt;
                    }
                    RemoteStatus::Unexpected(code) => {
                        return Err(ProtocolError::UnexpectedStatus(code));
                    }
                }
            }

            return Err(ProtocolError::Timeout {
                polls: self.config.max_polls,
            });
        }
    }
}

#[cfg(test)]
#[path = "validation_protocol_test.rs"]
mod tests;
