// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 爬取引擎模块
///
/// 定义爬取引擎接口并提供 Heritrix 实现
pub mod heritrix_engine;
pub mod traits;
