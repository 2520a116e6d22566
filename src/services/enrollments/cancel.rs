use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::EnrollmentService;
use super::approval::apply_transition;
use crate::models::{
    ApiResponse,
    enrollments::{
        entities::EnrollmentStatus,
        requests::{EnrollmentCancel, EnrollmentStatusChange},
    },
};

pub async fn cancel_enrollment(
    service: &EnrollmentService,
    request: &HttpRequest,
    enrollment_id: i64,
    cancel: EnrollmentCancel,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let change = EnrollmentStatusChange {
        status: EnrollmentStatus::Cancelled,
        reviewed_by: Some(cancel.cancelled_by.clone()),
        note: cancel.note,
        completed_at: None,
    };

    match apply_transition(&storage, enrollment_id, change).await {
        Ok(enrollment) => {
            info!(
                "Enrollment {} cancelled by {}",
                enrollment.id, cancel.cancelled_by
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                enrollment,
                "Enrollment cancelled successfully",
            )))
        }
        Err(failure) => Ok(failure.into_response()),
    }
}
