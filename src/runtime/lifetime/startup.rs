use crate::config::AppConfig;
use crate::errors::Result;
use crate::scheduler::SchedulerService;
use crate::scheduler::jobs::build_scheduler;
use crate::storage::Storage;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub scheduler: Arc<SchedulerService>,
}

/// 安装 rustls 加密实现，已安装时忽略
fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }
}

/// 准备服务器启动的上下文
/// 包括存储连接、数据库迁移和调度器任务注册，调度器此时尚未启动
pub async fn prepare_server_startup() -> Result<StartupContext> {
    install_crypto_provider();

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    let config = AppConfig::get();
    let scheduler = build_scheduler(storage.clone(), &config.scheduler)?;
    debug!(
        "Scheduler prepared with {} job(s)",
        scheduler.job_statuses().len()
    );

    Ok(StartupContext {
        storage,
        scheduler: Arc::new(scheduler),
    })
}
