use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::enrollments::requests::{
    BulkEnrollmentApproval, EnrollmentApproval, EnrollmentCancel, EnrollmentCreate,
    EnrollmentListQuery,
};
use crate::services::EnrollmentService;
use crate::utils::SafeEnrollmentIdI64;

// 懒加载的全局 ENROLLMENT_SERVICE 实例
static ENROLLMENT_SERVICE: Lazy<EnrollmentService> = Lazy::new(EnrollmentService::new_lazy);

// HTTP处理程序
pub async fn list_enrollments(
    req: HttpRequest,
    query: web::Query<EnrollmentListQuery>,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .list_enrollments(&req, query.into_inner())
        .await
}

pub async fn create_enrollment(
    req: HttpRequest,
    enrollment: web::Json<EnrollmentCreate>,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .create_enrollment(&req, enrollment.into_inner())
        .await
}

pub async fn get_enrollment(
    req: HttpRequest,
    enrollment_id: SafeEnrollmentIdI64,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE.get_enrollment(&req, enrollment_id.0).await
}

pub async fn delete_enrollment(
    req: HttpRequest,
    enrollment_id: SafeEnrollmentIdI64,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .delete_enrollment(&req, enrollment_id.0)
        .await
}

pub async fn review_enrollment(
    req: HttpRequest,
    enrollment_id: SafeEnrollmentIdI64,
    approval: web::Json<EnrollmentApproval>,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .review_enrollment(&req, enrollment_id.0, approval.into_inner())
        .await
}

pub async fn cancel_enrollment(
    req: HttpRequest,
    enrollment_id: SafeEnrollmentIdI64,
    cancel: web::Json<EnrollmentCancel>,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .cancel_enrollment(&req, enrollment_id.0, cancel.into_inner())
        .await
}

pub async fn bulk_approve(
    req: HttpRequest,
    bulk: web::Json<BulkEnrollmentApproval>,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE.bulk_approve(&req, bulk.into_inner()).await
}

// 配置路由
pub fn configure_enrollments_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/enrollments")
            .service(
                web::resource("")
                    .route(web::get().to(list_enrollments))
                    .route(web::post().to(create_enrollment)),
            )
            // 需在 /{enrollment_id} 之前注册
            .service(web::resource("/bulk-approve").route(web::post().to(bulk_approve)))
            .service(
                web::resource("/{enrollment_id}")
                    .route(web::get().to(get_enrollment))
                    .route(web::delete().to(delete_enrollment)),
            )
            .service(
                web::resource("/{enrollment_id}/approval")
                    .route(web::post().to(review_enrollment)),
            )
            .service(
                web::resource("/{enrollment_id}/cancel").route(web::post().to(cancel_enrollment)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test, web};
    use serde_json::{Value, json};
    use std::sync::Arc;

    use crate::models::ErrorCode;
    use crate::routes::configure_api_routes;
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::test_support::in_memory_storage;

    macro_rules! post_json {
        ($app:expr, $uri:expr, $body:expr) => {{
            let req = test::TestRequest::post()
                .uri($uri)
                .set_json($body)
                .to_request();
            let resp = test::call_service($app, req).await;
            let status = resp.status();
            let body: Value = test::read_body_json(resp).await;
            (status, body)
        }};
    }

    #[actix_web::test]
    async fn test_enrollment_review_flow() {
        let storage: Arc<dyn Storage> = Arc::new(in_memory_storage().await);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage))
                .configure(configure_api_routes),
        )
        .await;

        let (_, course) = post_json!(
            &app,
            "/api/v1/courses",
            json!({"title": "Crane Operation", "capacity": 1})
        );
        let course_id = course["data"]["id"].as_i64().unwrap();

        let mut enrollment_ids = Vec::new();
        for email in ["ada@example.com", "alan@example.com"] {
            let (status, student) = post_json!(
                &app,
                "/api/v1/students",
                json!({"first_name": "Test", "last_name": "Student", "email": email})
            );
            assert_eq!(status, StatusCode::CREATED);
            let student_id = student["data"]["id"].as_i64().unwrap();

            let (status, enrollment) = post_json!(
                &app,
                "/api/v1/enrollments",
                json!({"student_id": student_id, "course_id": course_id})
            );
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(enrollment["data"]["status"], "pending");
            enrollment_ids.push(enrollment["data"]["id"].as_i64().unwrap());

            // 重复报名
            let (status, _) = post_json!(
                &app,
                "/api/v1/enrollments",
                json!({"student_id": student_id, "course_id": course_id})
            );
            assert_eq!(status, StatusCode::CONFLICT);
        }

        let (status, body) = post_json!(
            &app,
            "/api/v1/enrollments/bulk-approve",
            json!({"enrollment_ids": [enrollment_ids[0], enrollment_ids[1], 999], "reviewed_by": "coordinator"})
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["approved"], json!([enrollment_ids[0]]));
        let failed = body["data"]["failed"].as_array().unwrap();
        assert_eq!(failed.len(), 2);
        assert_eq!(failed[0]["code"], ErrorCode::CourseFull as i32);
        assert_eq!(failed[1]["code"], ErrorCode::EnrollmentNotFound as i32);

        // 已通过的报名不能再次审批
        let (status, body) = post_json!(
            &app,
            &format!("/api/v1/enrollments/{}/approval", enrollment_ids[0]),
            json!({"approved": false, "reviewed_by": "coordinator"})
        );
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], ErrorCode::EnrollmentInvalidStatus as i32);

        let (status, body) = post_json!(
            &app,
            &format!("/api/v1/enrollments/{}/approval", enrollment_ids[1]),
            json!({"approved": false, "reviewed_by": "coordinator", "note": "course full"})
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "rejected");
        assert_eq!(body["data"]["reviewed_by"], "coordinator");

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/enrollments?status=approved&course_id={course_id}"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["pagination"]["total"], 1);
    }

    #[actix_web::test]
    async fn test_bulk_approve_validation() {
        let storage: Arc<dyn Storage> = Arc::new(in_memory_storage().await);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage))
                .configure(configure_api_routes),
        )
        .await;

        let (status, body) = post_json!(
            &app,
            "/api/v1/enrollments/bulk-approve",
            json!({"enrollment_ids": [1, 1], "reviewed_by": "coordinator"})
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], ErrorCode::ValidationFailed as i32);
    }

    #[actix_web::test]
    async fn test_cancel_releases_seat() {
        let storage: Arc<dyn Storage> = Arc::new(in_memory_storage().await);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage))
                .configure(configure_api_routes),
        )
        .await;

        let (_, course) = post_json!(
            &app,
            "/api/v1/courses",
            json!({"title": "Rigging Basics", "capacity": 1})
        );
        let course_id = course["data"]["id"].as_i64().unwrap();

        let mut enrollment_ids = Vec::new();
        for email in ["grace@example.com", "edsger@example.com"] {
            let (_, student) = post_json!(
                &app,
                "/api/v1/students",
                json!({"first_name": "Test", "last_name": "Student", "email": email})
            );
            let (_, enrollment) = post_json!(
                &app,
                "/api/v1/enrollments",
                json!({"student_id": student["data"]["id"], "course_id": course_id})
            );
            enrollment_ids.push(enrollment["data"]["id"].as_i64().unwrap());
        }

        let (status, _) = post_json!(
            &app,
            &format!("/api/v1/enrollments/{}/approval", enrollment_ids[0]),
            json!({"approved": true, "reviewed_by": "coordinator"})
        );
        assert_eq!(status, StatusCode::OK);

        let (status, body) = post_json!(
            &app,
            &format!("/api/v1/enrollments/{}/cancel", enrollment_ids[0]),
            json!({"cancelled_by": "coordinator", "note": "shift change"})
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "cancelled");
        assert_eq!(body["data"]["reviewed_by"], "coordinator");

        // 名额已释放
        let (status, body) = post_json!(
            &app,
            &format!("/api/v1/enrollments/{}/approval", enrollment_ids[1]),
            json!({"approved": true, "reviewed_by": "coordinator"})
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "approved");

        let (status, body) = post_json!(
            &app,
            &format!("/api/v1/enrollments/{}/cancel", enrollment_ids[0]),
            json!({"cancelled_by": "coordinator"})
        );
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], ErrorCode::EnrollmentInvalidStatus as i32);

        let (status, body) = post_json!(
            &app,
            "/api/v1/enrollments/999/cancel",
            json!({"cancelled_by": "coordinator"})
        );
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], ErrorCode::EnrollmentNotFound as i32);
    }
}
