// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据传输对象模块
///
/// 定义控制接口的请求体，并负责转换为领域模型
pub mod batch_request;
pub mod crawl_request;
pub mod document_request;
