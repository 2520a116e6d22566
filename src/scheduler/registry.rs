//! 后台任务状态登记表

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use crate::models::system::entities::{JobState, JobStatus};

/// 记录每个任务最近一次执行情况，可在线程间共享
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    inner: Arc<RwLock<HashMap<String, JobStatus>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记任务，返回 false 表示同名任务已存在
    pub fn register(&self, name: &str, interval: Duration) -> bool {
        let mut jobs = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if jobs.contains_key(name) {
            return false;
        }
        jobs.insert(
            name.to_string(),
            JobStatus {
                name: name.to_string(),
                interval_secs: interval.as_secs(),
                state: JobState::Idle,
                run_count: 0,
                skipped_count: 0,
                last_run_at: None,
                last_error: None,
            },
        );
        true
    }

    pub fn mark_running(&self, name: &str) {
        self.update(name, |status| {
            status.state = JobState::Running;
            status.last_run_at = Some(chrono::Utc::now());
        });
    }

    pub fn record_success(&self, name: &str) {
        self.update(name, |status| {
            status.state = JobState::Succeeded;
            status.run_count += 1;
            status.last_error = None;
        });
    }

    pub fn record_failure(&self, name: &str, error: String) {
        self.update(name, |status| {
            status.state = JobState::Failed;
            status.run_count += 1;
            status.last_error = Some(error);
        });
    }

    pub fn record_skipped(&self, name: &str, ticks: u64) {
        self.update(name, |status| status.skipped_count += ticks);
    }

    pub fn get_status(&self, name: &str) -> Option<JobStatus> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// 按任务名排序的全部状态
    pub fn snapshot(&self) -> Vec<JobStatus> {
        let mut jobs: Vec<JobStatus> = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        jobs.sort_by(|a, b| a.name.cmp(&b.name));
        jobs
    }

    fn update(&self, name: &str, f: impl FnOnce(&mut JobStatus)) {
        let mut jobs = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(status) = jobs.get_mut(name) {
            f(status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_rejects_duplicates() {
        let registry = JobRegistry::new();
        assert!(registry.register("enrollment_summary", Duration::from_secs(60)));
        assert!(!registry.register("enrollment_summary", Duration::from_secs(5)));

        let status = registry.get_status("enrollment_summary").unwrap();
        assert_eq!(status.interval_secs, 60);
        assert_eq!(status.state, JobState::Idle);
    }

    #[test]
    fn test_state_transitions() {
        let registry = JobRegistry::new();
        registry.register("b", Duration::from_secs(1));
        registry.register("a", Duration::from_secs(1));

        registry.mark_running("a");
        assert_eq!(registry.get_status("a").unwrap().state, JobState::Running);

        registry.record_failure("a", "database unavailable".to_string());
        let status = registry.get_status("a").unwrap();
        assert_eq!(status.state, JobState::Failed);
        assert_eq!(status.run_count, 1);
        assert_eq!(status.last_error.as_deref(), Some("database unavailable"));
        assert!(status.last_run_at.is_some());

        registry.record_success("a");
        registry.record_skipped("a", 2);
        let status = registry.get_status("a").unwrap();
        assert_eq!(status.state, JobState::Succeeded);
        assert_eq!(status.run_count, 2);
        assert_eq!(status.skipped_count, 2);
        assert!(status.last_error.is_none());

        let names: Vec<_> = registry.snapshot().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_unknown_job_is_ignored() {
        let registry = JobRegistry::new();
        registry.record_success("missing");
        assert!(registry.get_status("missing").is_none());
    }
}
