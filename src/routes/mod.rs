pub mod courses;

pub mod enrollments;

pub mod students;

pub mod system;

pub use courses::configure_courses_routes;
pub use enrollments::configure_enrollments_routes;
pub use students::configure_students_routes;
pub use system::configure_system_routes;

use actix_web::web;

/// 路由说明
#[derive(Debug, Clone, Copy)]
pub struct ApiRoute {
    pub method: &'static str,
    pub path: &'static str,
    pub summary: &'static str,
}

/// 全部对外接口
pub const API_ROUTES: &[ApiRoute] = &[
    ApiRoute { method: "GET", path: "/api/v1/students", summary: "List students (page, size, search, department)" },
    ApiRoute { method: "POST", path: "/api/v1/students", summary: "Create a student" },
    ApiRoute { method: "GET", path: "/api/v1/students/{student_id}", summary: "Get a student" },
    ApiRoute { method: "PUT", path: "/api/v1/students/{student_id}", summary: "Update a student" },
    ApiRoute { method: "DELETE", path: "/api/v1/students/{student_id}", summary: "Delete a student and their enrollments" },
    ApiRoute { method: "GET", path: "/api/v1/students/{student_id}/enrollments", summary: "List enrollments of a student" },
    ApiRoute { method: "GET", path: "/api/v1/courses", summary: "List courses (page, size, search)" },
    ApiRoute { method: "POST", path: "/api/v1/courses", summary: "Create a course" },
    ApiRoute { method: "GET", path: "/api/v1/courses/{course_id}", summary: "Get a course" },
    ApiRoute { method: "PUT", path: "/api/v1/courses/{course_id}", summary: "Update a course" },
    ApiRoute { method: "DELETE", path: "/api/v1/courses/{course_id}", summary: "Delete a course with its enrollments and comments" },
    ApiRoute { method: "GET", path: "/api/v1/courses/{course_id}/comments", summary: "List course comments, newest first" },
    ApiRoute { method: "POST", path: "/api/v1/courses/{course_id}/comments", summary: "Add a course comment" },
    ApiRoute { method: "POST", path: "/api/v1/courses/{course_id}/completions", summary: "Upload a completion CSV (email, completed_at)" },
    ApiRoute { method: "GET", path: "/api/v1/enrollments", summary: "List enrollments (page, size, status, course_id, student_id)" },
    ApiRoute { method: "POST", path: "/api/v1/enrollments", summary: "Create a pending enrollment" },
    ApiRoute { method: "POST", path: "/api/v1/enrollments/bulk-approve", summary: "Approve up to 200 pending enrollments" },
    ApiRoute { method: "GET", path: "/api/v1/enrollments/{enrollment_id}", summary: "Get an enrollment" },
    ApiRoute { method: "DELETE", path: "/api/v1/enrollments/{enrollment_id}", summary: "Delete an enrollment" },
    ApiRoute { method: "POST", path: "/api/v1/enrollments/{enrollment_id}/approval", summary: "Approve or reject a pending enrollment" },
    ApiRoute { method: "POST", path: "/api/v1/enrollments/{enrollment_id}/cancel", summary: "Cancel a pending or approved enrollment" },
    ApiRoute { method: "GET", path: "/api/v1/system/health", summary: "Liveness and uptime" },
    ApiRoute { method: "GET", path: "/api/v1/system/scheduler", summary: "Background job status" },
];

/// 注册全部 API 路由
pub fn configure_api_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_students_routes)
        .configure(configure_courses_routes)
        .configure(configure_enrollments_routes)
        .configure(configure_system_routes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_route_table_has_no_duplicates() {
        let unique: HashSet<_> = API_ROUTES.iter().map(|r| (r.method, r.path)).collect();
        assert_eq!(unique.len(), API_ROUTES.len());
        assert!(API_ROUTES.iter().all(|r| r.path.starts_with("/api/v1/")));
    }
}
