use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::errors::OnsiteError;
use crate::models::{ApiResponse, ErrorCode, courses::requests::CourseCreate};
use crate::services::{storage_error_response, validation_response};

pub async fn create_course(
    service: &CourseService,
    request: &HttpRequest,
    course: CourseCreate,
) -> ActixResult<HttpResponse> {
    if let Err(e) = course.validate() {
        return Ok(validation_response(&e));
    }

    let storage = service.get_storage(request);

    match storage.get_course_by_title(&course.title).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::CourseAlreadyExists,
                "A course with this title already exists",
            )));
        }
        Ok(None) => {}
        Err(e) => {
            return Ok(storage_error_response(
                &e,
                ErrorCode::CourseCreationFailed,
                "Failed to check course title",
            ));
        }
    }

    match storage.create_course(course).await {
        Ok(course) => Ok(HttpResponse::Created().json(ApiResponse::success(
            course,
            "Course created successfully",
        ))),
        Err(OnsiteError::Conflict(_)) => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(
                ErrorCode::CourseAlreadyExists,
                "A course with this title already exists",
            ),
        )),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::CourseCreationFailed,
            "Course creation failed",
        )),
    }
}
