// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含系统的核心业务逻辑服务：
/// - 任务注册表（job_registry）：被跟踪的爬取任务与批量任务
/// - 生命周期服务（lifecycle_service）：启动、暂停、终止、重启与完成检测
/// - 批量服务（batch_service）：批量任务的启动与聚合
/// - 校验协议（validation_protocol）：驱动远程校验服务完成单个任务
/// - 通知（notifier）：完成通知接口
pub mod batch_service;
pub mod job_registry;
pub mod lifecycle_service;
pub mod notifier;
pub mod validation_protocol;
