use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EnrollmentService;
use crate::errors::OnsiteError;
use crate::models::{ApiResponse, ErrorCode, enrollments::requests::EnrollmentCreate};
use crate::services::{storage_error_response, validation_response};

pub async fn create_enrollment(
    service: &EnrollmentService,
    request: &HttpRequest,
    enrollment: EnrollmentCreate,
) -> ActixResult<HttpResponse> {
    if let Err(e) = enrollment.validate() {
        return Ok(validation_response(&e));
    }

    let storage = service.get_storage(request);

    match storage.get_student_by_id(enrollment.student_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::StudentNotFound,
                "Student not found",
            )));
        }
        Err(e) => {
            return Ok(storage_error_response(
                &e,
                ErrorCode::EnrollmentCreationFailed,
                "Failed to get student information",
            ));
        }
    }

    match storage.get_course_by_id(enrollment.course_id).await {
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
                ErrorCode::EnrollmentCreationFailed,
                "Failed to get course information",
            ));
        }
    }

    // 每个学员每门课只能报名一次
    match storage
        .get_enrollment_by_student_and_course(enrollment.student_id, enrollment.course_id)
        .await
    {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::EnrollmentAlreadyExists,
                "Student is already enrolled in this course",
            )));
        }
        Ok(None) => {}
        Err(e) => {
            return Ok(storage_error_response(
                &e,
                ErrorCode::EnrollmentCreationFailed,
                "Failed to check existing enrollment",
            ));
        }
    }

    match storage.create_enrollment(enrollment).await {
        Ok(enrollment) => Ok(HttpResponse::Created().json(ApiResponse::success(
            enrollment,
            "Enrollment created successfully",
        ))),
        Err(OnsiteError::Conflict(_)) => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(
                ErrorCode::EnrollmentAlreadyExists,
                "Student is already enrolled in this course",
            ),
        )),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::EnrollmentCreationFailed,
            "Enrollment creation failed",
        )),
    }
}
