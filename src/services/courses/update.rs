use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::errors::OnsiteError;
use crate::models::{
    ApiResponse, ErrorCode,
    courses::requests::{CourseUpdate, validate_schedule},
};
use crate::services::{storage_error_response, validation_response};

pub async fn update_course(
    service: &CourseService,
    request: &HttpRequest,
    course_id: i64,
    update: CourseUpdate,
) -> ActixResult<HttpResponse> {
    if let Err(e) = update.validate() {
        return Ok(validation_response(&e));
    }

    let storage = service.get_storage(request);

    let existing = match storage.get_course_by_id(course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::CourseNotFound,
                "Course not found",
            )));
        }
        Err(e) => {
            return Ok(storage_error_response(
                &e,
                ErrorCode::CourseUpdateFailed,
                "Failed to get course information",
            ));
        }
    };

    // 合并后的起止时间仍需有效
    let starts_at = update.starts_at.or(existing.starts_at);
    let ends_at = update.ends_at.or(existing.ends_at);
    if let Err(e) = validate_schedule(starts_at, ends_at) {
        return Ok(validation_response(&e));
    }

    // 名额不能低于已占用数
    if let Some(capacity) = update.capacity {
        match storage.count_course_seats_taken(course_id).await {
            Ok(taken) if (capacity as u64) < taken => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::ValidationFailed,
                    format!("capacity must be at least {taken}, the number of seats taken"),
                )));
            }
            Ok(_) => {}
            Err(e) => {
                return Ok(storage_error_response(
                    &e,
                    ErrorCode::CourseUpdateFailed,
                    "Failed to count course seats",
                ));
            }
        }
    }

    // 标题唯一
    if let Some(ref title) = update.title {
        match storage.get_course_by_title(title).await {
            Ok(Some(other)) if other.id != course_id => {
                return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::CourseAlreadyExists,
                    "A course with this title already exists",
                )));
            }
            Ok(_) => {}
            Err(e) => {
                return Ok(storage_error_response(
                    &e,
                    ErrorCode::CourseUpdateFailed,
                    "Failed to check course title",
                ));
            }
        }
    }

    match storage.update_course(course_id, update).await {
        Ok(Some(course)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            course,
            "Course updated successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::CourseNotFound,
            "Course not found",
        ))),
        Err(OnsiteError::Conflict(_)) => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(
                ErrorCode::CourseAlreadyExists,
                "A course with this title already exists",
            ),
        )),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::CourseUpdateFailed,
            "Course update failed",
        )),
    }
}
