// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;
use tokio::sync::watch;

/// 等待一段时间，期间收到关闭信号则提前返回
///
/// 返回 `true` 表示收到了关闭信号。发送端被丢弃时视为没有关闭请求，
/// 照常等待到期。
pub async fn sleep_or_shutdown(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return true;
    }

    let sleep = tokio::time::sleep(duration);
    tokio::pin!(sleep);

    let stopped = tokio::select! {
        _ = &mut sleep => return false,
        res = shutdown.wait_for(|stop| *stop) => res.is_ok(),
    };
    if stopped {
        return true;
    }
    sleep.await;
    false
}
