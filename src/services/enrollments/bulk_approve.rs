use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::EnrollmentService;
use super::approval::apply_review;
use crate::models::{
    ApiResponse,
    enrollments::{
        entities::EnrollmentStatus,
        requests::BulkEnrollmentApproval,
        responses::{BulkApprovalFailure, BulkApprovalResponse},
    },
};
use crate::services::validation_response;

/// 批量审批通过，逐条独立处理，单条失败不影响其他
pub async fn bulk_approve(
    service: &EnrollmentService,
    request: &HttpRequest,
    bulk: BulkEnrollmentApproval,
) -> ActixResult<HttpResponse> {
    if let Err(e) = bulk.validate() {
        return Ok(validation_response(&e));
    }

    let storage = service.get_storage(request);
    let mut response = BulkApprovalResponse::default();

    for enrollment_id in bulk.enrollment_ids {
        match apply_review(
            &storage,
            enrollment_id,
            EnrollmentStatus::Approved,
            &bulk.reviewed_by,
            None,
        )
        .await
        {
            Ok(enrollment) => response.approved.push(enrollment.id),
            Err(failure) => response.failed.push(BulkApprovalFailure {
                enrollment_id,
                code: failure.code as i32,
                message: failure.message,
            }),
        }
    }

    info!(
        "Bulk approval by {}: {} approved, {} failed",
        bulk.reviewed_by,
        response.approved.len(),
        response.failed.len()
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Bulk approval completed")))
}
