use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::{error, info};

use super::EnrollmentService;
use crate::errors::OnsiteError;
use crate::models::{
    ApiResponse, ErrorCode,
    enrollments::{
        entities::{Enrollment, EnrollmentStatus, StatusTransition},
        requests::{EnrollmentApproval, EnrollmentStatusChange},
    },
};
use crate::storage::Storage;

/// 审批失败原因
#[derive(Debug)]
pub(crate) struct ReviewFailure {
    pub status: StatusCode,
    pub code: ErrorCode,
    pub message: String,
}

impl ReviewFailure {
    fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn storage(err: OnsiteError) -> Self {
        error!("Enrollment review failed: {}", err);
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InternalServerError,
            format!("Enrollment review failed: {err}"),
        )
    }

    pub fn into_response(self) -> HttpResponse {
        HttpResponse::build(self.status).json(ApiResponse::error_empty(self.code, self.message))
    }
}

/// 按流转规则变更报名状态，失败原因映射为响应
pub(crate) async fn apply_transition(
    storage: &Arc<dyn Storage>,
    enrollment_id: i64,
    change: EnrollmentStatusChange,
) -> Result<Enrollment, ReviewFailure> {
    let target = change.status;

    match storage
        .transition_enrollment_status(enrollment_id, change)
        .await
        .map_err(ReviewFailure::storage)?
    {
        StatusTransition::Applied(enrollment) => Ok(enrollment),
        StatusTransition::NotFound => Err(ReviewFailure::new(
            StatusCode::NOT_FOUND,
            ErrorCode::EnrollmentNotFound,
            "Enrollment not found",
        )),
        StatusTransition::InvalidStatus(current) => Err(ReviewFailure::new(
            StatusCode::CONFLICT,
            ErrorCode::EnrollmentInvalidStatus,
            format!("Enrollment is {current}, cannot change to {target}"),
        )),
        StatusTransition::CourseNotFound => Err(ReviewFailure::new(
            StatusCode::NOT_FOUND,
            ErrorCode::CourseNotFound,
            "Course not found",
        )),
        StatusTransition::CourseFull(title) => Err(ReviewFailure::new(
            StatusCode::CONFLICT,
            ErrorCode::CourseFull,
            format!("Course '{title}' has no seats left"),
        )),
    }
}

/// 将一条待审批报名改为通过或拒绝
///
/// 只有待审批可流转到通过 / 拒绝；通过时检查课程名额（已通过 + 已结业 不超过 capacity）。
pub(crate) async fn apply_review(
    storage: &Arc<dyn Storage>,
    enrollment_id: i64,
    target: EnrollmentStatus,
    reviewed_by: &str,
    note: Option<String>,
) -> Result<Enrollment, ReviewFailure> {
    let change = EnrollmentStatusChange {
        status: target,
        reviewed_by: Some(reviewed_by.to_string()),
        note,
        completed_at: None,
    };

    let updated = apply_transition(storage, enrollment_id, change).await?;

    info!(
        "Enrollment {} {} by {}",
        updated.id, updated.status, reviewed_by
    );
    Ok(updated)
}

pub async fn review_enrollment(
    service: &EnrollmentService,
    request: &HttpRequest,
    enrollment_id: i64,
    approval: EnrollmentApproval,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let target = approval.target_status();

    match apply_review(
        &storage,
        enrollment_id,
        target,
        &approval.reviewed_by,
        approval.note,
    )
    .await
    {
        Ok(enrollment) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            enrollment,
            "Enrollment reviewed successfully",
        ))),
        Err(failure) => Ok(failure.into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::courses::requests::CourseCreate;
    use crate::models::enrollments::requests::EnrollmentCreate;
    use crate::models::students::requests::StudentCreate;
    use crate::storage::sea_orm_storage::test_support::in_memory_storage;

    async fn seed(storage: &Arc<dyn Storage>, capacity: i32, students: usize) -> (i64, Vec<i64>) {
        let course = storage
            .create_course(CourseCreate {
                title: "Scaffold Inspection".to_string(),
                description: None,
                instructor: None,
                location: None,
                starts_at: None,
                ends_at: None,
                capacity: Some(capacity),
                lms_course_id: None,
            })
            .await
            .unwrap();

        let mut ids = Vec::new();
        for i in 0..students {
            let student = storage
                .create_student(StudentCreate {
                    first_name: "Trainee".to_string(),
                    last_name: format!("No{i}"),
                    email: format!("trainee{i}@example.com"),
                    employee_id: None,
                    department: None,
                })
                .await
                .unwrap();
            let enrollment = storage
                .create_enrollment(EnrollmentCreate {
                    student_id: student.id,
                    course_id: course.id,
                    note: None,
                })
                .await
                .unwrap();
            ids.push(enrollment.id);
        }
        (course.id, ids)
    }

    #[tokio::test]
    async fn test_concurrent_reviews_do_not_overbook() {
        let storage: Arc<dyn Storage> = Arc::new(in_memory_storage().await);
        let (course_id, ids) = seed(&storage, 1, 2).await;

        let (a, b) = tokio::join!(
            apply_review(&storage, ids[0], EnrollmentStatus::Approved, "coordinator", None),
            apply_review(&storage, ids[1], EnrollmentStatus::Approved, "coordinator", None),
        );

        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        let failure = a.err().or(b.err()).unwrap();
        assert_eq!(failure.status, StatusCode::CONFLICT);
        assert_eq!(failure.code, ErrorCode::CourseFull);
        assert_eq!(storage.count_course_seats_taken(course_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_approve_and_reject_one_wins() {
        let storage: Arc<dyn Storage> = Arc::new(in_memory_storage().await);
        let (_, ids) = seed(&storage, 5, 1).await;

        let (a, b) = tokio::join!(
            apply_review(&storage, ids[0], EnrollmentStatus::Approved, "alice", None),
            apply_review(&storage, ids[0], EnrollmentStatus::Rejected, "bob", None),
        );

        let winner = match (a, b) {
            (Ok(e), Err(f)) | (Err(f), Ok(e)) => {
                assert_eq!(f.code, ErrorCode::EnrollmentInvalidStatus);
                e
            }
            (a, b) => panic!("exactly one review should apply: {a:?} / {b:?}"),
        };

        let stored = storage.get_enrollment_by_id(ids[0]).await.unwrap().unwrap();
        assert_eq!(stored.status, winner.status);
        assert_eq!(stored.reviewed_by, winner.reviewed_by);
    }

    #[tokio::test]
    async fn test_review_requires_pending() {
        let storage: Arc<dyn Storage> = Arc::new(in_memory_storage().await);
        let (_, ids) = seed(&storage, 5, 1).await;

        apply_review(&storage, ids[0], EnrollmentStatus::Rejected, "alice", None)
            .await
            .unwrap();
        let failure = apply_review(&storage, ids[0], EnrollmentStatus::Approved, "alice", None)
            .await
            .unwrap_err();
        assert_eq!(failure.code, ErrorCode::EnrollmentInvalidStatus);

        let failure = apply_review(&storage, 999, EnrollmentStatus::Approved, "alice", None)
            .await
            .unwrap_err();
        assert_eq!(failure.status, StatusCode::NOT_FOUND);
    }
}
