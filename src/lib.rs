// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 请求体转换和文档提交用例
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含爬取任务、校验结果等核心模型，以及生命周期、批量和校验协议服务
pub mod domain;

/// 引擎模块
///
/// 外部爬取引擎的接口与 Heritrix 实现
pub mod engines;

/// 基础设施模块
///
/// 数据库、校验服务客户端、通知和报告存储
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由和处理器
pub mod presentation;

/// 队列模块
///
/// 持久化的校验任务队列
pub mod queue;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 校验工作器、健康信号和工作器管理
pub mod workers;

#[cfg(test)]
pub mod test_support;
