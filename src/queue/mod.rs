// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 提供持久化的校验任务队列，进程重启后从快照恢复
pub mod validation_queue;
