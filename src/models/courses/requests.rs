use chrono::{DateTime, Utc};
use serde::Deserialize;
use ts_rs::TS;

use crate::errors::{OnsiteError, Result};
use crate::models::common::PaginationQuery;
use crate::utils::validate::{limit_text, require_text};

const MAX_TITLE_CHARS: usize = 200;

// 课程列表查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseListQuery {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
}

// 创建课程请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseCreate {
    pub title: String,
    pub description: Option<String>,
    pub instructor: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub capacity: Option<i32>,
    pub lms_course_id: Option<String>,
}

impl CourseCreate {
    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)?;
        validate_capacity(self.capacity)?;
        validate_schedule(self.starts_at, self.ends_at)
    }
}

// 更新课程请求
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructor: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub capacity: Option<i32>,
    pub lms_course_id: Option<String>,
}

impl CourseUpdate {
    /// 只校验本次提交的字段；起止时间需结合现有记录另行校验
    pub fn validate(&self) -> Result<()> {
        if let Some(ref title) = self.title {
            validate_title(title)?;
        }
        validate_capacity(self.capacity)?;
        validate_schedule(self.starts_at, self.ends_at)
    }
}

fn validate_title(title: &str) -> Result<()> {
    require_text("title", title)?;
    limit_text("title", title, MAX_TITLE_CHARS)
}

fn validate_capacity(capacity: Option<i32>) -> Result<()> {
    match capacity {
        Some(c) if c <= 0 => Err(OnsiteError::validation("capacity must be positive")),
        _ => Ok(()),
    }
}

/// 起止时间都存在时，结束时间不得早于开始时间
pub fn validate_schedule(
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
) -> Result<()> {
    if let (Some(start), Some(end)) = (starts_at, ends_at)
        && end < start
    {
        return Err(OnsiteError::validation(
            "ends_at must not be earlier than starts_at",
        ));
    }
    Ok(())
}
