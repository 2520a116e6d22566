use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::CourseCommentService;
use crate::models::{ApiResponse, ErrorCode, course_comments::requests::CourseCommentCreate};
use crate::services::{storage_error_response, validation_response};

pub async fn create_comment(
    service: &CourseCommentService,
    request: &HttpRequest,
    course_id: i64,
    comment: CourseCommentCreate,
) -> ActixResult<HttpResponse> {
    if let Err(e) = comment.validate() {
        return Ok(validation_response(&e));
    }

    let storage = service.get_storage(request);

    match storage.get_course_by_id(course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::CourseNotFound,
                "Course not found",
            )));
        }
        Err(e) => {
            return Ok(storage_error_response(
                &e,
                ErrorCode::CommentCreationFailed,
                "Failed to get course information",
            ));
        }
    }

    match storage.create_course_comment(course_id, comment).await {
        Ok(comment) => {
            info!(
                "Comment {} added to course {} by {}",
                comment.id, comment.course_id, comment.created_by
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                comment,
                "Comment created successfully",
            )))
        }
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::CommentCreationFailed,
            "Comment creation failed",
        )),
    }
}
