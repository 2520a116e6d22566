use serde::Serialize;
use ts_rs::TS;

// 后台任务最近一次执行状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "system.ts")]
pub enum JobState {
    Idle,
    Running,
    Succeeded,
    Failed,
}

// 后台任务状态快照
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "system.ts")]
pub struct JobStatus {
    pub name: String,
    pub interval_secs: u64,
    pub state: JobState,
    pub run_count: u64,
    pub skipped_count: u64,
    pub last_run_at: Option<chrono::DateTime<chrono::Utc>>,
    pub last_error: Option<String>,
}
