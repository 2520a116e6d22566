use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::StudentService;
use crate::errors::OnsiteError;
use crate::models::{ApiResponse, ErrorCode, students::requests::StudentCreate};
use crate::services::{storage_error_response, validation_response};

pub async fn create_student(
    service: &StudentService,
    request: &HttpRequest,
    student: StudentCreate,
) -> ActixResult<HttpResponse> {
    if let Err(e) = student.validate() {
        return Ok(validation_response(&e));
    }

    let storage = service.get_storage(request);

    // 邮箱唯一
    match storage.get_student_by_email(&student.email).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::StudentAlreadyExists,
                "A student with this email already exists",
            )));
        }
        Ok(None) => {}
        Err(e) => {
            return Ok(storage_error_response(
                &e,
                ErrorCode::StudentCreationFailed,
                "Failed to check student email",
            ));
        }
    }

    // 工号唯一
    if let Some(ref employee_id) = student.employee_id {
        match storage.get_student_by_employee_id(employee_id).await {
            Ok(Some(_)) => {
                return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::StudentAlreadyExists,
                    "A student with this employee id already exists",
                )));
            }
            Ok(None) => {}
            Err(e) => {
                return Ok(storage_error_response(
                    &e,
                    ErrorCode::StudentCreationFailed,
                    "Failed to check employee id",
                ));
            }
        }
    }

    match storage.create_student(student).await {
        Ok(student) => Ok(HttpResponse::Created().json(ApiResponse::success(
            student,
            "Student created successfully",
        ))),
        Err(OnsiteError::Conflict(_)) => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::StudentAlreadyExists, "Student already exists"),
        )),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::StudentCreationFailed,
            "Student creation failed",
        )),
    }
}
