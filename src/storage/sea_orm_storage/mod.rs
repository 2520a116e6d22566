//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod course_comments;
mod courses;
mod enrollments;
mod students;

use crate::config::{AppConfig, DatabaseConfig};
use crate::errors::{OnsiteError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        Self::connect(&AppConfig::get().database).await
    }

    /// 按给定数据库配置连接并执行迁移
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let db_url = Self::build_database_url(&config.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| OnsiteError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| OnsiteError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| OnsiteError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.timeout))
            .acquire_timeout(Duration::from_secs(config.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| OnsiteError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(OnsiteError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite:, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

/// 写操作错误转换：唯一约束冲突单独归为 Conflict
pub(crate) fn map_write_err(context: &str, err: DbErr) -> OnsiteError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            OnsiteError::conflict(format!("{context}: {detail}"))
        }
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
            OnsiteError::validation(format!("{context}: {detail}"))
        }
        _ => OnsiteError::database_operation(format!("{context}: {err}")),
    }
}

/// 可选文本字段归一化：去除首尾空白，空串视为清空
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 学员模块
    async fn create_student(&self, student: StudentCreate) -> Result<Student> {
        self.create_student_impl(student).await
    }

    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>> {
        self.get_student_by_id_impl(id).await
    }

    async fn get_student_by_email(&self, email: &str) -> Result<Option<Student>> {
        self.get_student_by_email_impl(email).await
    }

    async fn get_student_by_employee_id(&self, employee_id: &str) -> Result<Option<Student>> {
        self.get_student_by_employee_id_impl(employee_id).await
    }

    async fn find_students_by_emails(
        &self,
        emails: &[String],
    ) -> Result<HashMap<String, Student>> {
        self.find_students_by_emails_impl(emails).await
    }

    async fn list_students_with_pagination(
        &self,
        query: StudentListQuery,
    ) -> Result<PaginatedResponse<Student>> {
        self.list_students_with_pagination_impl(query).await
    }

    async fn update_student(&self, id: i64, update: StudentUpdate) -> Result<Option<Student>> {
        self.update_student_impl(id, update).await
    }

    async fn delete_student(&self, id: i64) -> Result<bool> {
        self.delete_student_impl(id).await
    }

    // 课程模块
    async fn create_course(&self, course: CourseCreate) -> Result<Course> {
        self.create_course_impl(course).await
    }

    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>> {
        self.get_course_by_id_impl(id).await
    }

    async fn get_course_by_title(&self, title: &str) -> Result<Option<Course>> {
        self.get_course_by_title_impl(title).await
    }

    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<PaginatedResponse<Course>> {
        self.list_courses_with_pagination_impl(query).await
    }

    async fn update_course(&self, id: i64, update: CourseUpdate) -> Result<Option<Course>> {
        self.update_course_impl(id, update).await
    }

    async fn delete_course(&self, id: i64) -> Result<bool> {
        self.delete_course_impl(id).await
    }

    // 报名模块
    async fn create_enrollment(&self, enrollment: EnrollmentCreate) -> Result<Enrollment> {
        self.create_enrollment_impl(enrollment).await
    }

    async fn get_enrollment_by_id(&self, id: i64) -> Result<Option<Enrollment>> {
        self.get_enrollment_by_id_impl(id).await
    }

    async fn get_enrollment_by_student_and_course(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>> {
        self.get_enrollment_by_student_and_course_impl(student_id, course_id)
            .await
    }

    async fn list_enrollments_with_pagination(
        &self,
        query: EnrollmentListQuery,
    ) -> Result<PaginatedResponse<Enrollment>> {
        self.list_enrollments_with_pagination_impl(query).await
    }

    async fn transition_enrollment_status(
        &self,
        id: i64,
        change: EnrollmentStatusChange,
    ) -> Result<StatusTransition> {
        self.transition_enrollment_status_impl(id, change).await
    }

    async fn count_course_seats_taken(&self, course_id: i64) -> Result<u64> {
        self.count_course_seats_taken_impl(course_id).await
    }

    async fn count_enrollments_by_status(&self) -> Result<HashMap<EnrollmentStatus, u64>> {
        self.count_enrollments_by_status_impl().await
    }

    async fn delete_enrollment(&self, id: i64) -> Result<bool> {
        self.delete_enrollment_impl(id).await
    }

    // 课程评论模块
    async fn create_course_comment(
        &self,
        course_id: i64,
        comment: CourseCommentCreate,
    ) -> Result<CourseCommentResponse> {
        self.create_course_comment_impl(course_id, comment).await
    }

    async fn list_course_comments(&self, course_id: i64) -> Result<Vec<CourseCommentResponse>> {
        self.list_course_comments_impl(course_id).await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::SeaOrmStorage;
    use crate::config::DatabaseConfig;

    /// 单连接内存 SQLite，已执行迁移
    pub(crate) async fn in_memory_storage() -> SeaOrmStorage {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            pool_size: 1,
            timeout: 5,
        };
        SeaOrmStorage::connect(&config)
            .await
            .expect("in-memory storage should initialize")
    }
}
