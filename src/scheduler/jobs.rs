//! 内置后台任务

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::SchedulerService;
use crate::config::SchedulerConfig;
use crate::errors::Result;
use crate::models::enrollments::entities::EnrollmentStatus;
use crate::storage::Storage;

pub const ENROLLMENT_SUMMARY_JOB: &str = "enrollment_summary";

/// 统计各状态报名数量并写入日志
pub async fn enrollment_summary(storage: Arc<dyn Storage>) -> Result<()> {
    let counts = storage.count_enrollments_by_status().await?;
    let count_of = |status: EnrollmentStatus| counts.get(&status).copied().unwrap_or(0);

    info!(
        pending = count_of(EnrollmentStatus::Pending),
        approved = count_of(EnrollmentStatus::Approved),
        rejected = count_of(EnrollmentStatus::Rejected),
        completed = count_of(EnrollmentStatus::Completed),
        cancelled = count_of(EnrollmentStatus::Cancelled),
        "Enrollment summary"
    );
    Ok(())
}

/// 按配置构建调度器并注册内置任务
pub fn build_scheduler(
    storage: Arc<dyn Storage>,
    config: &SchedulerConfig,
) -> Result<SchedulerService> {
    let scheduler = SchedulerService::new();

    if !config.enabled {
        info!("Scheduler jobs disabled by configuration");
        return Ok(scheduler);
    }

    scheduler.register_job(
        ENROLLMENT_SUMMARY_JOB,
        Duration::from_secs(config.enrollment_summary_interval),
        move || enrollment_summary(storage.clone()),
    )?;

    Ok(scheduler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_support::in_memory_storage;

    #[tokio::test]
    async fn test_enrollment_summary_runs_on_empty_database() {
        let storage: Arc<dyn Storage> = Arc::new(in_memory_storage().await);
        assert!(enrollment_summary(storage).await.is_ok());
    }

    #[tokio::test]
    async fn test_build_scheduler_respects_config() {
        let storage: Arc<dyn Storage> = Arc::new(in_memory_storage().await);

        let enabled = SchedulerConfig {
            enabled: true,
            enrollment_summary_interval: 3600,
        };
        let scheduler = build_scheduler(storage.clone(), &enabled).unwrap();
        let statuses = scheduler.job_statuses();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].name, ENROLLMENT_SUMMARY_JOB);
        assert_eq!(statuses[0].interval_secs, 3600);

        let disabled = SchedulerConfig {
            enabled: false,
            enrollment_summary_interval: 3600,
        };
        assert!(build_scheduler(storage, &disabled).unwrap().job_statuses().is_empty());
    }

    #[tokio::test]
    async fn test_zero_interval_is_rejected() {
        let storage: Arc<dyn Storage> = Arc::new(in_memory_storage().await);
        let config = SchedulerConfig {
            enabled: true,
            enrollment_summary_interval: 0,
        };
        assert!(build_scheduler(storage, &config).is_err());
    }
}
