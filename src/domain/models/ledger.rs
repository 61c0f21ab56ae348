// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::validation::ValidationOutcome;

/// 错误/属性账本
///
/// 每个爬取任务拥有一个账本，校验工作器在处理该任务的文档时写入，
/// API请求读取快照用于报告。所有更新在同一把写锁内完成，
/// 读者只会看到完整的快照。
#[derive(Debug, Default)]
pub struct ErrorLedger {
    state: RwLock<LedgerSnapshot>,
}

/// 账本快照
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LedgerSnapshot {
    /// 规则ID -> 出现次数
    pub error_occurrences: BTreeMap<String, u64>,
    /// 合格文档数
    pub valid_documents: u64,
    /// 不合格文档数
    pub invalid_documents: u64,
    /// 处理失败的文档数
    pub processing_errors: u64,
}

impl LedgerSnapshot {
    /// 所有规则的错误总数
    pub fn total_errors(&self) -> u64 {
        self.error_occurrences.values().sum()
    }
}

impl ErrorLedger {
    /// 合并一组错误计数
    pub fn merge_error_counts(&self, counts: &HashMap<String, u64>) {
        let mut state = self.state.write();
        for (rule, count) in counts {
            *state.error_occurrences.entry(rule.clone()).or_insert(0) += count;
        }
    }

    /// 记录一次校验结果
    ///
    /// 错误计数与文档统计一起更新
    pub fn record_outcome(&self, outcome: &ValidationOutcome) {
        let counts = outcome.error_counts();
        let mut state = self.state.write();
        for (rule, count) in counts {
            *state.error_occurrences.entry(rule).or_insert(0) += count;
        }
        if outcome.is_valid {
            state.valid_documents += 1;
        } else {
            state.invalid_documents += 1;
        }
        if outcome.processing_error.is_some() {
            state.processing_errors += 1;
        }
    }

    /// 获取一致的快照
    pub fn snapshot(&self) -> LedgerSnapshot {
        self.state.read().clone()
    }

    /// 清空账本，仅在任务重启时调用
    pub fn clear(&self) {
        *self.state.write() = LedgerSnapshot::default();
    }
}
