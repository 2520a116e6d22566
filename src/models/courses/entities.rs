use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 课程实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub instructor: Option<String>,
    // 上课地点（教室 / 车间）
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    // 名额上限，None 表示不限
    pub capacity: Option<i32>,
    // 外部 LMS 中的课程标识
    pub lms_course_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// 名额是否还能再容纳 `taken + 1` 人
    pub fn has_seat_for(&self, taken: u64) -> bool {
        match self.capacity {
            Some(capacity) => taken < capacity.max(0) as u64,
            None => true,
        }
    }
}
