//! 服务生命周期：调度器在服务开始前启动，在服务结束后关闭

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tracing::{error, info};

use crate::errors::OnsiteError;
use crate::scheduler::Scheduler;

/// 在调度器的生命周期内运行 `serve`
///
/// `start()` 失败时直接返回错误，`serve` 不会被执行。
/// `serve` 结束（包括出错和 panic）后 `shutdown()` 恰好执行一次；
/// 关闭失败只记录日志，返回值保持为 `serve` 的结果，panic 会继续传播。
pub async fn run_with_lifespan<F, T, E>(
    scheduler: Arc<dyn Scheduler>,
    serve: F,
) -> std::result::Result<T, E>
where
    F: Future<Output = std::result::Result<T, E>>,
    E: From<OnsiteError>,
{
    if let Err(e) = scheduler.start().await {
        error!("Scheduler failed to start, aborting startup: {}", e);
        return Err(E::from(e));
    }
    info!("Scheduler started");

    let outcome = AssertUnwindSafe(serve).catch_unwind().await;

    if let Err(e) = scheduler.shutdown().await {
        error!("Scheduler shutdown failed: {}", e);
    } else {
        info!("Scheduler shut down");
    }

    match outcome {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
