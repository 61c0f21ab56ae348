// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::batch_job::BatchJob;
use crate::domain::models::crawl_job::CrawlJob;
use crate::domain::models::ledger::ErrorLedger;

/// 占位结果
#[derive(Debug)]
pub enum Reservation {
    /// 新任务已登记
    Reserved,
    /// 已存在同一URL的任务，未做任何修改
    Existing(CrawlJob),
    /// 强制启动时替换了旧任务
    Replaced {
        /// 被替换的旧任务
        previous: CrawlJob,
    },
}

/// 被跟踪任务的注册表
///
/// 进程启动时创建，由生命周期管理器、批量服务和校验工作器共享。
/// 锁只在内存操作期间持有，从不跨越引擎、仓库或通知调用。
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<Uuid, CrawlJob>>,
    batches: Mutex<HashMap<Uuid, BatchJob>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以URL唯一性为前提登记新任务
    ///
    /// 检查与插入在同一把锁内完成。`force` 为 true 时移除同URL的旧任务。
    pub fn reserve(&self, job: CrawlJob, force: bool) -> Reservation {
        let mut jobs = self.jobs.lock();
        let existing = jobs
            .values()
            .find(|j| j.crawl_url == job.crawl_url)
            .cloned();

        match existing {
            Some(existing) if !force => Reservation::Existing(existing),
            Some(previous) => {
                jobs.remove(&previous.id);
                jobs.insert(job.id, job);
                Reservation::Replaced { previous }
            }
            None => {
                jobs.insert(job.id, job);
                Reservation::Reserved
            }
        }
    }

    /// 获取任务副本
    pub fn get(&self, id: Uuid) -> Option<CrawlJob> {
        self.jobs.lock().get(&id).cloned()
    }

    /// 按规范化URL查找任务
    pub fn find_by_url(&self, crawl_url: &str) -> Option<CrawlJob> {
        self.jobs
            .lock()
            .values()
            .find(|j| j.crawl_url == crawl_url)
            .cloned()
    }

    /// 解析任务的账本
    pub fn ledger(&self, id: Uuid) -> Option<Arc<ErrorLedger>> {
        self.jobs.lock().get(&id).map(|j| j.ledger.clone())
    }

    /// 在锁内修改任务
    ///
    /// 任务不存在时返回 `None`
    pub fn update<T>(&self, id: Uuid, f: impl FnOnce(&mut CrawlJob) -> T) -> Option<T> {
        self.jobs.lock().get_mut(&id).map(f)
    }

    /// 停止跟踪任务
    pub fn remove(&self, id: Uuid) -> Option<CrawlJob> {
        self.jobs.lock().remove(&id)
    }

    /// 从存储恢复任务
    ///
    /// 同一URL已有任务时保留已登记的那个
    pub fn restore(&self, job: CrawlJob) -> bool {
        let mut jobs = self.jobs.lock();
        if jobs.values().any(|j| j.crawl_url == job.crawl_url) {
            return false;
        }
        jobs.insert(job.id, job);
        true
    }

    /// 是否正在跟踪该任务
    pub fn contains(&self, id: Uuid) -> bool {
        self.jobs.lock().contains_key(&id)
    }

    /// 被跟踪任务数量
    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }

    /// 登记批量任务
    pub fn insert_batch(&self, batch: BatchJob) {
        self.batches.lock().insert(batch.id, batch);
    }

    /// 获取批量任务副本
    pub fn get_batch(&self, id: Uuid) -> Option<BatchJob> {
        self.batches.lock().get(&id).cloned()
    }

    /// 在锁内修改批量任务
    pub fn update_batch<T>(&self, id: Uuid, f: impl FnOnce(&mut BatchJob) -> T) -> Option<T> {
        self.batches.lock().get_mut(&id).map(f)
    }
}
