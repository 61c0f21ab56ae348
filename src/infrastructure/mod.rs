// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 包含系统的技术实现细节，负责与外部系统的交互。
///
/// 包含的子模块：
/// - 数据库（database）：连接、迁移和实体映射
/// - 指标（metrics）：Prometheus 指标
/// - 仓库实现（repositories）：领域仓库接口的SeaORM实现
/// - 服务实现（services）：通知器
/// - 存储（storage）：校验报告文件
/// - 校验（validation）：远程校验服务客户端
pub mod database;
pub mod metrics;
pub mod repositories;
pub mod services;
pub mod storage;
pub mod validation;
