// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：爬取任务、批量任务、校验任务与账本
/// - 仓库接口（repositories）：数据持久化抽象接口
/// - 服务（services）：生命周期、批量聚合、校验协议等领域服务
///
/// 领域层不依赖于任何具体的外部实现。
pub mod models;
pub mod repositories;
pub mod services;
