//! 后台任务调度
//!
//! 每个任务在独立的 tokio 任务中按固定间隔执行；关闭时通过 watch 通道通知
//! 所有任务退出并等待其结束。

pub mod jobs;
mod registry;

pub use registry::JobRegistry;

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures_util::FutureExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::errors::{OnsiteError, Result};
use crate::models::system::entities::JobStatus;

pub type JobFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;
pub type JobFn = Arc<dyn Fn() -> JobFuture + Send + Sync>;

/// 调度器生命周期接口
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// 启动全部任务，重复启动返回错误
    async fn start(&self) -> Result<()>;
    /// 停止全部任务并等待退出，未启动时直接返回
    async fn shutdown(&self) -> Result<()>;
}

#[derive(Clone)]
struct RegisteredJob {
    name: String,
    interval: Duration,
    job: JobFn,
}

struct RunningState {
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<(String, JoinHandle<()>)>,
}

/// 基于 tokio interval 的调度器
#[derive(Default)]
pub struct SchedulerService {
    jobs: Mutex<Vec<RegisteredJob>>,
    registry: JobRegistry,
    running: Mutex<Option<RunningState>>,
}

impl SchedulerService {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册任务，必须在启动前调用
    pub fn register_job<F, Fut>(&self, name: &str, interval: Duration, job: F) -> Result<()>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        if interval.is_zero() {
            return Err(OnsiteError::scheduler(format!(
                "Job '{name}' interval must be positive"
            )));
        }
        if self.is_running() {
            return Err(OnsiteError::scheduler(format!(
                "Cannot register job '{name}' while the scheduler is running"
            )));
        }
        if !self.registry.register(name, interval) {
            return Err(OnsiteError::scheduler(format!(
                "Job '{name}' is already registered"
            )));
        }

        let job: JobFn = Arc::new(move || Box::pin(job()) as JobFuture);
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RegisteredJob {
                name: name.to_string(),
                interval,
                job,
            });

        debug!("Registered job '{}' every {:?}", name, interval);
        Ok(())
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn job_statuses(&self) -> Vec<JobStatus> {
        self.registry.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[async_trait]
impl Scheduler for SchedulerService {
    async fn start(&self) -> Result<()> {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if running.is_some() {
            return Err(OnsiteError::scheduler("Scheduler is already running"));
        }

        let jobs = self
            .jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handles = jobs
            .into_iter()
            .map(|job| {
                let name = job.name.clone();
                let handle = tokio::spawn(run_job_loop(
                    job,
                    self.registry.clone(),
                    shutdown_rx.clone(),
                ));
                (name, handle)
            })
            .collect::<Vec<_>>();

        info!("Scheduler started with {} job(s)", handles.len());
        *running = Some(RunningState {
            shutdown_tx,
            handles,
        });
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        let state = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(state) = state else {
            debug!("Scheduler shutdown requested but it is not running");
            return Ok(());
        };

        // 接收端可能已全部退出，发送失败无需处理
        let _ = state.shutdown_tx.send(true);

        let mut failed = Vec::new();
        for (name, handle) in state.handles {
            if let Err(e) = handle.await {
                error!("Job '{}' task ended abnormally: {}", name, e);
                failed.push(name);
            }
        }

        if !failed.is_empty() {
            return Err(OnsiteError::scheduler(format!(
                "Job task(s) ended abnormally: {}",
                failed.join(", ")
            )));
        }

        info!("Scheduler stopped");
        Ok(())
    }
}

async fn run_job_loop(
    job: RegisteredJob,
    registry: JobRegistry,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(job.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // 第一次 tick 立即完成，跳过它使任务在一个周期后才首次执行
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_once(&job, &registry).await;
            }
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    debug!("Job '{}' received shutdown", job.name);
                    break;
                }
            }
        }
    }
}

async fn run_once(job: &RegisteredJob, registry: &JobRegistry) {
    registry.mark_running(&job.name);
    let started = Instant::now();

    match AssertUnwindSafe((job.job)()).catch_unwind().await {
        Ok(Ok(())) => {
            registry.record_success(&job.name);
            debug!("Job '{}' finished in {:?}", job.name, started.elapsed());
        }
        Ok(Err(e)) => {
            warn!("Job '{}' failed: {}", job.name, e);
            registry.record_failure(&job.name, e.to_string());
        }
        Err(_) => {
            error!("Job '{}' panicked", job.name);
            registry.record_failure(&job.name, "job panicked".to_string());
        }
    }

    // 执行期间错过的 tick 不补跑，只计数
    let missed = started.elapsed().as_millis() / job.interval.as_millis().max(1);
    if missed > 0 {
        registry.record_skipped(&job.name, missed as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::system::entities::JobState;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_shutdown_without_start_is_ok() {
        let scheduler = SchedulerService::new();
        assert!(scheduler.shutdown().await.is_ok());
        assert!(scheduler.shutdown().await.is_ok());
    }

    #[tokio::test]
    async fn test_double_start_fails() {
        let scheduler = SchedulerService::new();
        scheduler.start().await.unwrap();
        let err = scheduler.start().await.unwrap_err();
        assert_eq!(err.code(), "E010");

        scheduler.shutdown().await.unwrap();
        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_and_zero_interval() {
        let scheduler = SchedulerService::new();
        scheduler
            .register_job("noop", Duration::from_secs(1), || async { Ok(()) })
            .unwrap();
        assert!(
            scheduler
                .register_job("noop", Duration::from_secs(2), || async { Ok(()) })
                .is_err()
        );
        assert!(
            scheduler
                .register_job("zero", Duration::ZERO, || async { Ok(()) })
                .is_err()
        );
        assert_eq!(scheduler.job_statuses().len(), 1);
    }

    #[tokio::test]
    async fn test_jobs_run_until_shutdown() {
        let scheduler = SchedulerService::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let runs = counter.clone();
        scheduler
            .register_job("tick", Duration::from_millis(20), move || {
                let runs = runs.clone();
                async move {
                    runs.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .unwrap();
        scheduler
            .register_job("broken", Duration::from_millis(20), || async {
                Err(OnsiteError::database_operation("boom"))
            })
            .unwrap();

        scheduler.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        scheduler.shutdown().await.unwrap();

        let runs = counter.load(Ordering::SeqCst);
        assert!(runs >= 2, "expected at least two runs, got {runs}");

        // 关闭后不再执行
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(counter.load(Ordering::SeqCst), runs);

        let tick = scheduler.registry().get_status("tick").unwrap();
        assert_eq!(tick.run_count as usize, runs);
        assert_eq!(tick.state, JobState::Succeeded);

        let broken = scheduler.registry().get_status("broken").unwrap();
        assert_eq!(broken.state, JobState::Failed);
        assert!(broken.last_error.unwrap().contains("boom"));
    }

    #[tokio::test]
    async fn test_register_while_running_fails() {
        let scheduler = SchedulerService::new();
        scheduler.start().await.unwrap();
        assert!(
            scheduler
                .register_job("late", Duration::from_secs(1), || async { Ok(()) })
                .is_err()
        );
        scheduler.shutdown().await.unwrap();
    }
}
