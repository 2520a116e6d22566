use super::entities::JobStatus;
use serde::Serialize;
use ts_rs::TS;

// 健康检查响应
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "system.ts")]
pub struct HealthResponse {
    pub status: String,
    pub system_name: String,
    pub version: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub uptime_secs: i64,
}

// 调度器状态响应
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "system.ts")]
pub struct SchedulerStatusResponse {
    pub running: bool,
    pub jobs: Vec<JobStatus>,
}
