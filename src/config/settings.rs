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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含服务器、数据库、爬取引擎、校验服务、通知和指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 数据库配置
    pub database: DatabaseSettings,
    /// Heritrix 爬取引擎配置
    pub heritrix: HeritrixSettings,
    /// 校验流水线配置
    pub validation: ValidationSettings,
    /// 通知配置
    pub notification: NotificationSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
    /// 对外地址，用于生成通知中的任务链接
    pub public_url: String,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// Heritrix 配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct HeritrixSettings {
    /// 引擎地址
    pub url: String,
    /// 用户名
    pub user: String,
    /// 密码
    pub password: String,
    /// 引擎任务目录
    pub jobs_dir: String,
    /// 是否接受自签名证书
    pub accept_invalid_certs: bool,
    /// 单次请求超时时间（秒）
    pub request_timeout_secs: u64,
    /// 自定义任务配置模板路径
    pub config_template_path: Option<String>,
}

/// 校验流水线配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationSettings {
    /// 远程校验服务地址
    pub service_url: String,
    /// 队列快照文件路径
    pub snapshot_path: String,
    /// 两次状态轮询之间的间隔（秒）
    pub poll_interval_secs: u64,
    /// 每轮最多轮询次数
    pub max_polls: u32,
    /// 服务要求重试时最多重发次数
    pub max_retries: u32,
    /// 传输失败后重试的等待时间（秒）
    pub transport_retry_secs: u64,
    /// 传输失败最多重试次数，为空表示不限
    pub transport_max_attempts: Option<u32>,
    /// 队列为空时的等待时间（秒）
    pub idle_interval_secs: u64,
}

/// 通知配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationSettings {
    /// 是否通过邮件中继发送通知
    pub enabled: bool,
    /// 邮件中继地址
    pub relay_url: Option<String>,
    /// 发件人地址
    pub sender: String,
    /// 请求签名密钥
    pub secret: Option<String>,
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// Prometheus 导出器监听地址
    pub listen_address: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载内置默认值、`config/default`、`config/{APP_ENVIRONMENT}`
    /// 以及 `VERICRAWL__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("VERICRAWL").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// 仅包含内置默认值的配置构建器
    pub fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            // Server
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.public_url", "http://localhost:8080")?
            // Database
            .set_default("database.url", "sqlite://vericrawl.db?mode=rwc")?
            .set_default("database.max_connections", 20)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Crawl engine
            .set_default("heritrix.url", "https://localhost:8443")?
            .set_default("heritrix.user", "admin")?
            .set_default("heritrix.password", "admin")?
            .set_default("heritrix.jobs_dir", "/opt/heritrix/jobs")?
            .set_default("heritrix.accept_invalid_certs", true)?
            .set_default("heritrix.request_timeout_secs", 30)?
            // Validation pipeline
            .set_default("validation.service_url", "http://localhost:8090/api/validate")?
            .set_default("validation.snapshot_path", "validation-jobs.txt")?
            .set_default("validation.poll_interval_secs", 10)?
            .set_default("validation.max_polls", 30)?
            .set_default("validation.max_retries", 2)?
            .set_default("validation.transport_retry_secs", 60)?
            .set_default("validation.idle_interval_secs", 60)?
            // Notification
            .set_default("notification.enabled", false)?
            .set_default("notification.sender", "vericrawl@localhost")?
            // Metrics
            .set_default("metrics.listen_address", "0.0.0.0:9000")
    }
}
