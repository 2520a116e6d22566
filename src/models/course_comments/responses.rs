use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 课程评论响应，由持久化记录逐字段转换而来
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "course_comment.ts")]
pub struct CourseCommentResponse {
    pub id: i64,
    pub course_id: i64,
    pub comment: String,
    pub created_by: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
