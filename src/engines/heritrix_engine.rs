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
use regex::Regex;
use reqwest::{header, Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::settings::HeritrixSettings;
use crate::engines::traits::{CrawlEngine, EngineError};

/// 种子列表占位符
const SEEDS_PLACEHOLDER: &str = "{{SEEDS}}";

/// 默认任务配置模板
///
/// 只覆盖种子列表，其余配置使用引擎默认值
const DEFAULT_JOB_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<beans xmlns="http://www.springframework.org/schema/beans"
       xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
       xsi:schemaLocation="http://www.springframework.org/schema/beans
           http://www.springframework.org/schema/beans/spring-beans-3.0.xsd">
  <bean id="longerOverrides" class="org.springframework.beans.factory.config.PropertyOverrideConfigurer">
    <property name="properties">
      <props>
        <prop key="seeds.textSource.value">
{{SEEDS}}
        </prop>
      </props>
    </property>
  </bean>
</beans>
"#;

/// Heritrix 爬取引擎
///
/// 通过 Heritrix REST API 管理爬取任务。引擎中的任务名即爬取任务ID。
pub struct HeritrixEngine {
    /// HTTP客户端
    client: Client,
    /// 引擎地址，例如 `https://localhost:8443`
    base_url: String,
    /// 用户名
    user: String,
    /// 密码
    password: String,
    /// 引擎任务目录
    jobs_dir: String,
    /// 任务配置模板
    template: String,
    /// 控制器状态匹配
    state_pattern: Regex,
    /// 退出状态匹配
    exit_pattern: Regex,
}

impl HeritrixEngine {
    /// 创建新的 Heritrix 引擎实例
    ///
    /// # 参数
    ///
    /// * `settings` - 引擎配置
    /// * `template` - 任务配置模板，为空时使用默认模板
    ///
    /// # 返回值
    ///
    /// * `Ok(HeritrixEngine)` - 引擎实例
    /// * `Err(EngineError)` - HTTP客户端创建失败
    pub fn new(settings: &HeritrixSettings, template: Option<String>) -> Result<Self, EngineError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("Vericrawl/0.1.0"),
        );
        let client = Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.url.trim_end_matches('/').to_string(),
            user: settings.user.clone(),
            password: settings.password.clone(),
            jobs_dir: settings.jobs_dir.trim_end_matches('/').to_string(),
            template: template.unwrap_or_else(|| DEFAULT_JOB_TEMPLATE.to_string()),
            state_pattern: Regex::new(r"<crawlControllerState>([^<]+)</crawlControllerState>")
                .map_err(|e| EngineError::Other(e.to_string()))?,
            exit_pattern: Regex::new(r"<crawlExitStatus>([^<]+)</crawlExitStatus>")
                .map_err(|e| EngineError::Other(e.to_string()))?,
        })
    }

    fn job_url(&self, job_id: Uuid) -> String {
        format!("{}/engine/job/{}", self.base_url, job_id)
    }

    /// 渲染任务配置，把种子URL逐行写入模板
    pub fn render_job_config(&self, seed_urls: &[String]) -> String {
        self.template.replace(SEEDS_PLACEHOLDER, &seed_urls.join("\n"))
    }

    /// 从任务状态XML中提取状态文本
    ///
    /// 控制器状态为 FINISHED 时附带退出状态，例如 `FINISHED: ABORTED`；
    /// 尚未构建的任务没有控制器状态，返回 `UNBUILT`
    pub fn parse_status(&self, body: &str) -> String {
        let state = self
            .state_pattern
            .captures(body)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string());
        let exit = self
            .exit_pattern
            .captures(body)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string());

        match (state, exit) {
            (Some(state), Some(exit)) if state.eq_ignore_ascii_case("finished") => {
                if exit.eq_ignore_ascii_case("finished") {
                    state
                } else {
                    format!("{}: {}", state, exit)
                }
            }
            (Some(state), _) => state,
            (None, _) => "UNBUILT".to_string(),
        }
    }

    async fn check(response: Response, job_id: Option<Uuid>) -> Result<Response, EngineError> {
        let status = response.status();
        if status.is_success() || status.is_redirection() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            if let Some(id) = job_id {
                return Err(EngineError::JobNotFound(id));
            }
        }
        let body = response.text().await.unwrap_or_default();
        Err(EngineError::UnexpectedResponse {
            status: status.as_u16(),
            body,
        })
    }

    async fn job_action(&self, job_id: Uuid, action: &str) -> Result<(), EngineError> {
        debug!("Sending action '{}' for job {}", action, job_id);
        let response = self
            .client
            .post(self.job_url(job_id))
            .basic_auth(&self.user, Some(&self.password))
            .form(&[("action", action)])
            .send()
            .await?;
        Self::check(response, Some(job_id)).await?;
        Ok(())
    }
}

#[async_trait]
impl CrawlEngine for HeritrixEngine {
    async fn create(&self, job_id: Uuid, seed_urls: &[String]) -> Result<(), EngineError> {
        let job_name = job_id.to_string();
        let response = self
            .client
            .post(format!("{}/engine", self.base_url))
            .basic_auth(&self.user, Some(&self.password))
            .form(&[("action", "create"), ("createpath", job_name.as_str())])
            .send()
            .await?;
        Self::check(response, None).await?;

        let response = self
            .client
            .put(format!("{}/jobdir/crawler-beans.cxml", self.job_url(job_id)))
            .basic_auth(&self.user, Some(&self.password))
            .header(header::CONTENT_TYPE, "application/xml")
            .body(self.render_job_config(seed_urls))
            .send()
            .await?;
        Self::check(response, Some(job_id)).await?;

        info!("Created engine job {} with {} seed(s)", job_id, seed_urls.len());
        Ok(())
    }

    async fn build(&self, job_id: Uuid) -> Result<(), EngineError> {
        self.job_action(job_id, "build").await
    }

    async fn launch(&self, job_id: Uuid) -> Result<(), EngineError> {
        self.job_action(job_id, "launch").await
    }

    async fn pause(&self, job_id: Uuid) -> Result<(), EngineError> {
        self.job_action(job_id, "pause").await
    }

    async fn unpause(&self, job_id: Uuid) -> Result<(), EngineError> {
        self.job_action(job_id, "unpause").await
    }

    async fn terminate(&self, job_id: Uuid) -> Result<(), EngineError> {
        self.job_action(job_id, "terminate").await
    }

    async fn teardown(&self, job_id: Uuid) -> Result<(), EngineError> {
        self.job_action(job_id, "teardown").await
    }

    async fn status(&self, job_id: Uuid) -> Result<String, EngineError> {
        let response = self
            .client
            .get(self.job_url(job_id))
            .basic_auth(&self.user, Some(&self.password))
            .header(header::ACCEPT, "application/xml")
            .send()
            .await?;
        let body = Self::check(response, Some(job_id)).await?.text().await?;
        Ok(self.parse_status(&body))
    }

    async fn result_location(&self, job_id: Uuid) -> Result<String, EngineError> {
        // Reports are written next to the mirror directory of the latest launch
        Ok(format!("{}/{}/latest/", self.jobs_dir, job_id))
    }

    async fn is_available(&self) -> bool {
        match self
            .client
            .get(format!("{}/engine", self.base_url))
            .basic_auth(&self.user, Some(&self.password))
            .header(header::ACCEPT, "application/xml")
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Crawl engine is not reachable: {}", e);
                false
            }
        }
    }

    fn name(&self) -> &'static str {
        "heritrix"
    }
}
