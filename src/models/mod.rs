//! 对外数据模型（请求 / 响应 / 业务实体）

pub mod common;
pub mod course_comments;
pub mod courses;
pub mod enrollments;
pub mod students;
pub mod system;

pub use common::{ApiResponse, PaginatedResponse, PaginationInfo, PaginationQuery};

use serde::Serialize;

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 业务错误码
///
/// 写入响应信封的 `code` 字段，按模块分段：
/// 1xxx 通用，2xxx 学员，3xxx 课程，4xxx 报名，5xxx 评论，6xxx 上传，9xxx 系统。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 1000,
    ValidationFailed = 1001,
    NotFound = 1004,
    Conflict = 1009,
    InternalServerError = 1500,

    StudentNotFound = 2000,
    StudentAlreadyExists = 2001,
    StudentCreationFailed = 2002,
    StudentUpdateFailed = 2003,
    StudentDeleteFailed = 2004,

    CourseNotFound = 3000,
    CourseAlreadyExists = 3001,
    CourseCreationFailed = 3002,
    CourseUpdateFailed = 3003,
    CourseDeleteFailed = 3004,
    CourseFull = 3005,

    EnrollmentNotFound = 4000,
    EnrollmentAlreadyExists = 4001,
    EnrollmentCreationFailed = 4002,
    EnrollmentInvalidStatus = 4003,
    EnrollmentDeleteFailed = 4004,

    CommentCreationFailed = 5000,

    FileUploadFailed = 6000,
    ImportFileParseFailed = 6001,
    ImportFileMissingColumn = 6002,
    ImportFileDataInvalid = 6003,
    FileSizeExceeded = 6004,

    SchedulerUnavailable = 9000,
}
