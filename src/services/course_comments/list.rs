use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseCommentService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::storage_error_response;

pub async fn list_comments(
    service: &CourseCommentService,
    request: &HttpRequest,
    course_id: i64,
) -> ActixResult<HttpResponse> {
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
                ErrorCode::InternalServerError,
                "Failed to get course information",
            ));
        }
    }

    match storage.list_course_comments(course_id).await {
        Ok(comments) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            comments,
            "Comments retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::InternalServerError,
            "Failed to retrieve comments",
        )),
    }
}
