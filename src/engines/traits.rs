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
use thiserror::Error;
use uuid::Uuid;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 引擎返回了非成功状态码
    #[error("Unexpected response from crawl engine: {status} {body}")]
    UnexpectedResponse {
        /// HTTP状态码
        status: u16,
        /// 响应内容
        body: String,
    },
    /// 引擎中不存在该任务
    #[error("Job {0} not found in crawl engine")]
    JobNotFound(Uuid),
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

/// 爬取引擎特质
///
/// 外部爬取引擎的窄接口。所有调用都可能失败，
/// 调用方把失败视为"状态未变化"，记录日志后继续。
#[async_trait]
pub trait CrawlEngine: Send + Sync {
    /// 使用种子URL创建引擎任务
    async fn create(&self, job_id: Uuid, seed_urls: &[String]) -> Result<(), EngineError>;

    /// 构建任务
    async fn build(&self, job_id: Uuid) -> Result<(), EngineError>;

    /// 启动任务
    async fn launch(&self, job_id: Uuid) -> Result<(), EngineError>;

    /// 暂停任务
    async fn pause(&self, job_id: Uuid) -> Result<(), EngineError>;

    /// 恢复任务
    async fn unpause(&self, job_id: Uuid) -> Result<(), EngineError>;

    /// 终止任务
    async fn terminate(&self, job_id: Uuid) -> Result<(), EngineError>;

    /// 拆除任务，释放引擎资源
    async fn teardown(&self, job_id: Uuid) -> Result<(), EngineError>;

    /// 查询任务状态文本
    async fn status(&self, job_id: Uuid) -> Result<String, EngineError>;

    /// 查询任务结果所在位置
    async fn result_location(&self, job_id: Uuid) -> Result<String, EngineError>;

    /// 引擎是否可用
    async fn is_available(&self) -> bool;

    /// 引擎名称
    fn name(&self) -> &'static str;
}
