pub mod course_comments;
pub mod courses;
pub mod enrollments;
pub mod students;
pub mod system;

pub use course_comments::CourseCommentService;
pub use courses::CourseService;
pub use enrollments::EnrollmentService;
pub use students::StudentService;
pub use system::SystemService;

use actix_web::HttpResponse;
use tracing::error;

use crate::errors::OnsiteError;
use crate::models::{ApiResponse, ErrorCode};

/// 校验失败统一返回 400
pub(crate) fn validation_response(err: &OnsiteError) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::ValidationFailed,
        err.message(),
    ))
}

/// 存储层错误转换为响应；非业务类错误使用 `fallback` 错误码并记录日志
pub(crate) fn storage_error_response(
    err: &OnsiteError,
    fallback: ErrorCode,
    context: &str,
) -> HttpResponse {
    match err {
        OnsiteError::Validation(_) => validation_response(err),
        OnsiteError::NotFound(msg) => HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::NotFound, msg.as_str())),
        OnsiteError::Conflict(msg) => HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::Conflict,
            format!("{context}: {msg}"),
        )),
        _ => {
            error!("{}: {}", context, err);
            HttpResponse::InternalServerError()
                .json(ApiResponse::error_empty(fallback, format!("{context}: {err}")))
        }
    }
}
