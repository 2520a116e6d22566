use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::course_comments::requests::CourseCommentCreate;
use crate::models::courses::requests::{CourseCreate, CourseListQuery, CourseUpdate};
use crate::services::{CourseCommentService, CourseService, EnrollmentService};
use crate::utils::SafeCourseIdI64;

// 懒加载的全局服务实例
static COURSE_SERVICE: Lazy<CourseService> = Lazy::new(CourseService::new_lazy);
static COMMENT_SERVICE: Lazy<CourseCommentService> = Lazy::new(CourseCommentService::new_lazy);
static ENROLLMENT_SERVICE: Lazy<EnrollmentService> = Lazy::new(EnrollmentService::new_lazy);

// HTTP处理程序
pub async fn list_courses(
    req: HttpRequest,
    query: web::Query<CourseListQuery>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_courses(&req, query.into_inner()).await
}

pub async fn create_course(
    req: HttpRequest,
    course: web::Json<CourseCreate>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.create_course(&req, course.into_inner()).await
}

pub async fn get_course(req: HttpRequest, course_id: SafeCourseIdI64) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.get_course(&req, course_id.0).await
}

pub async fn update_course(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    update: web::Json<CourseUpdate>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .update_course(&req, course_id.0, update.into_inner())
        .await
}

pub async fn delete_course(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.delete_course(&req, course_id.0).await
}

pub async fn list_comments(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
) -> ActixResult<HttpResponse> {
    COMMENT_SERVICE.list_comments(&req, course_id.0).await
}

pub async fn create_comment(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    comment: web::Json<CourseCommentCreate>,
) -> ActixResult<HttpResponse> {
    COMMENT_SERVICE
        .create_comment(&req, course_id.0, comment.into_inner())
        .await
}

pub async fn upload_completions(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    ENROLLMENT_SERVICE
        .upload_completions(&req, course_id.0, payload)
        .await
}

// 配置路由
pub fn configure_courses_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/courses")
            .service(
                web::resource("")
                    .route(web::get().to(list_courses))
                    .route(web::post().to(create_course)),
            )
            .service(
                web::resource("/{course_id}")
                    .route(web::get().to(get_course))
                    .route(web::put().to(update_course))
                    .route(web::delete().to(delete_course)),
            )
            .service(
                web::resource("/{course_id}/comments")
                    .route(web::get().to(list_comments))
                    .route(web::post().to(create_comment)),
            )
            .service(
                // 结业名单（multipart，字段名 file）
                web::resource("/{course_id}/completions")
                    .route(web::post().to(upload_completions)),
            ),
    );
}
