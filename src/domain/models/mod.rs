// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 爬取任务（crawl_job）：单URL爬取任务及其状态机
/// - 批量任务（batch_job）：一组爬取任务的聚合
/// - 账本（ledger）：每个任务的错误统计
/// - 校验（validation）：校验任务与校验结果
/// - 办公文档（office_document）：爬取中发现的办公文档元数据
pub mod batch_job;
pub mod crawl_job;
pub mod ledger;
pub mod office_document;
pub mod validation;
