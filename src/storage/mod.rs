use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{
    PaginatedResponse,
    course_comments::{requests::CourseCommentCreate, responses::CourseCommentResponse},
    courses::{
        entities::Course,
        requests::{CourseCreate, CourseListQuery, CourseUpdate},
    },
    enrollments::{
        entities::{Enrollment, EnrollmentStatus, StatusTransition},
        requests::{EnrollmentCreate, EnrollmentListQuery, EnrollmentStatusChange},
    },
    students::{
        entities::Student,
        requests::{StudentCreate, StudentListQuery, StudentUpdate},
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 学员管理方法
    // 创建学员
    async fn create_student(&self, student: StudentCreate) -> Result<Student>;
    // 通过ID获取学员
    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>>;
    // 通过邮箱获取学员
    async fn get_student_by_email(&self, email: &str) -> Result<Option<Student>>;
    // 通过工号获取学员
    async fn get_student_by_employee_id(&self, employee_id: &str) -> Result<Option<Student>>;
    // 批量按邮箱查询学员（忽略大小写，键为小写邮箱）
    async fn find_students_by_emails(&self, emails: &[String])
    -> Result<HashMap<String, Student>>;
    // 列出学员
    async fn list_students_with_pagination(
        &self,
        query: StudentListQuery,
    ) -> Result<PaginatedResponse<Student>>;
    // 更新学员
    async fn update_student(&self, id: i64, update: StudentUpdate) -> Result<Option<Student>>;
    // 删除学员（级联删除其报名）
    async fn delete_student(&self, id: i64) -> Result<bool>;

    /// 课程管理方法
    // 创建课程
    async fn create_course(&self, course: CourseCreate) -> Result<Course>;
    // 通过ID获取课程
    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>>;
    // 通过标题获取课程
    async fn get_course_by_title(&self, title: &str) -> Result<Option<Course>>;
    // 列出课程
    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<PaginatedResponse<Course>>;
    // 更新课程
    async fn update_course(&self, id: i64, update: CourseUpdate) -> Result<Option<Course>>;
    // 删除课程（级联删除报名与评论）
    async fn delete_course(&self, id: i64) -> Result<bool>;

    /// 报名管理方法
    // 创建报名（待审批）
    async fn create_enrollment(&self, enrollment: EnrollmentCreate) -> Result<Enrollment>;
    // 通过ID获取报名
    async fn get_enrollment_by_id(&self, id: i64) -> Result<Option<Enrollment>>;
    // 获取学员在某课程的报名
    async fn get_enrollment_by_student_and_course(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>>;
    // 列出报名
    async fn list_enrollments_with_pagination(
        &self,
        query: EnrollmentListQuery,
    ) -> Result<PaginatedResponse<Enrollment>>;
    // 按流转规则变更报名状态，规则与名额检查和写入在同一事务内完成
    async fn transition_enrollment_status(
        &self,
        id: i64,
        change: EnrollmentStatusChange,
    ) -> Result<StatusTransition>;
    // 统计课程已占用名额（已通过 + 已结业）
    async fn count_course_seats_taken(&self, course_id: i64) -> Result<u64>;
    // 按状态统计全部报名
    async fn count_enrollments_by_status(&self) -> Result<HashMap<EnrollmentStatus, u64>>;
    // 删除报名
    async fn delete_enrollment(&self, id: i64) -> Result<bool>;

    /// 课程评论方法
    // 创建评论
    async fn create_course_comment(
        &self,
        course_id: i64,
        comment: CourseCommentCreate,
    ) -> Result<CourseCommentResponse>;
    // 列出课程评论（新的在前）
    async fn list_course_comments(&self, course_id: i64) -> Result<Vec<CourseCommentResponse>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
