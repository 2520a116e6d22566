use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::StudentService;
use crate::errors::OnsiteError;
use crate::models::{ApiResponse, ErrorCode, students::requests::StudentUpdate};
use crate::services::{storage_error_response, validation_response};

pub async fn update_student(
    service: &StudentService,
    request: &HttpRequest,
    student_id: i64,
    update: StudentUpdate,
) -> ActixResult<HttpResponse> {
    if update.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "No fields to update",
        )));
    }
    if let Err(e) = update.validate() {
        return Ok(validation_response(&e));
    }

    let storage = service.get_storage(request);

    // 修改邮箱时检查是否被其他学员占用
    if let Some(ref email) = update.email {
        match storage.get_student_by_email(email).await {
            Ok(Some(other)) if other.id != student_id => {
                return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::StudentAlreadyExists,
                    "A student with this email already exists",
                )));
            }
            Ok(_) => {}
            Err(e) => {
                return Ok(storage_error_response(
                    &e,
                    ErrorCode::StudentUpdateFailed,
                    "Failed to check student email",
                ));
            }
        }
    }

    match storage.update_student(student_id, update).await {
        Ok(Some(student)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            student,
            "Student updated successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::StudentNotFound,
            "Student not found",
        ))),
        Err(OnsiteError::Conflict(_)) => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(
                ErrorCode::StudentAlreadyExists,
                "Email or employee id already in use",
            ),
        )),
        Err(e) => Ok(storage_error_response(
            &e,
            ErrorCode::StudentUpdateFailed,
            "Student update failed",
        )),
    }
}
