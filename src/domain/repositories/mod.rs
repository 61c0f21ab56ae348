// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，遵循依赖倒置原则。
/// 具体实现由基础设施层提供。
///
/// 包含的仓库接口：
/// - 爬取任务仓库（crawl_job_repository）：爬取任务记录的持久化
/// - 校验文档仓库（validated_document_repository）：校验错误、属性与处理错误
/// - 办公文档仓库（office_document_repository）：办公文档元数据
/// - 报告存储（report_storage）：每个任务的合格/不合格报告文件
pub mod crawl_job_repository;
pub mod office_document_repository;
pub mod report_storage;
pub mod validated_document_repository;

pub use crawl_job_repository::RepositoryError;
