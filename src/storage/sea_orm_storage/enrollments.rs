//! 报名存储操作

use std::collections::HashMap;

use super::{SeaOrmStorage, map_write_err, non_empty};
use crate::entity::courses::Entity as Courses;
use crate::entity::enrollments::{ActiveModel, Column, Entity as Enrollments};
use crate::errors::{OnsiteError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    enrollments::{
        entities::{Enrollment, EnrollmentStatus, StatusTransition},
        requests::{EnrollmentCreate, EnrollmentListQuery, EnrollmentStatusChange},
    },
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建报名，初始状态为待审批
    pub async fn create_enrollment_impl(&self, req: EnrollmentCreate) -> Result<Enrollment> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            student_id: Set(req.student_id),
            course_id: Set(req.course_id),
            status: Set(EnrollmentStatus::PENDING.to_string()),
            note: Set(non_empty(req.note)),
            reviewed_by: Set(None),
            reviewed_at: Set(None),
            completed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_err("创建报名失败", e))?;

        Ok(result.into_enrollment())
    }

    /// 通过 ID 获取报名
    pub async fn get_enrollment_by_id_impl(&self, id: i64) -> Result<Option<Enrollment>> {
        let result = Enrollments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| OnsiteError::database_operation(format!("查询报名失败: {e}")))?;

        Ok(result.map(|m| m.into_enrollment()))
    }

    /// 获取学员在某课程的报名
    pub async fn get_enrollment_by_student_and_course_impl(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>> {
        let result = Enrollments::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::CourseId.eq(course_id))
            .one(&self.db)
            .await
            .map_err(|e| OnsiteError::database_operation(format!("查询报名失败: {e}")))?;

        Ok(result.map(|m| m.into_enrollment()))
    }

    /// 分页列出报名
    pub async fn list_enrollments_with_pagination_impl(
        &self,
        query: EnrollmentListQuery,
    ) -> Result<PaginatedResponse<Enrollment>> {
        let (page, size) = query.pagination.normalized();

        let mut select = Enrollments::find();

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }

        if let Some(course_id) = query.course_id {
            select = select.filter(Column::CourseId.eq(course_id));
        }

        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }

        select = select.order_by_desc(Column::CreatedAt).order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| OnsiteError::database_operation(format!("查询报名总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| OnsiteError::database_operation(format!("查询报名页数失败: {e}")))?;

        let enrollments = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| OnsiteError::database_operation(format!("查询报名列表失败: {e}")))?;

        Ok(PaginatedResponse {
            items: enrollments
                .into_iter()
                .map(|m| m.into_enrollment())
                .collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 按流转规则变更报名状态
    ///
    /// 读取当前状态、检查流转规则与课程名额、按原状态条件写入在同一事务内完成。
    /// 占用名额的流转会锁定课程行（SQLite 下由写锁串行化）；
    /// 写入时原状态已被其他请求改变则返回 `InvalidStatus`。
    pub async fn transition_enrollment_status_impl(
        &self,
        id: i64,
        change: EnrollmentStatusChange,
    ) -> Result<StatusTransition> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| OnsiteError::database_operation(format!("开启事务失败: {e}")))?;

        let Some(current) = Enrollments::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| OnsiteError::database_operation(format!("查询报名失败: {e}")))?
        else {
            return Ok(StatusTransition::NotFound);
        };
        let current = current.into_enrollment();

        if !current.status.can_transition_to(change.status) {
            return Ok(StatusTransition::InvalidStatus(current.status));
        }

        let seat_holding = EnrollmentStatus::seat_holding();
        if seat_holding.contains(&change.status) && !seat_holding.contains(&current.status) {
            let Some(course) = Courses::find_by_id(current.course_id)
                .lock_exclusive()
                .one(&txn)
                .await
                .map_err(|e| OnsiteError::database_operation(format!("查询课程失败: {e}")))?
            else {
                return Ok(StatusTransition::CourseNotFound);
            };

            let taken = count_seats_taken(&txn, course.id).await?;
            let course = course.into_course();
            if !course.has_seat_for(taken) {
                return Ok(StatusTransition::CourseFull(course.title));
            }
        }

        let now = chrono::Utc::now();
        let mut update = Enrollments::update_many()
            .col_expr(Column::Status, Expr::value(change.status.as_str()))
            .col_expr(Column::UpdatedAt, Expr::value(now.timestamp()));

        if let Some(reviewed_by) = non_empty(change.reviewed_by) {
            update = update
                .col_expr(Column::ReviewedBy, Expr::value(reviewed_by))
                .col_expr(Column::ReviewedAt, Expr::value(now.timestamp()));
        }

        if change.note.is_some() {
            update = update.col_expr(Column::Note, Expr::value(non_empty(change.note)));
        }

        if change.status == EnrollmentStatus::Completed {
            let completed_at = change.completed_at.unwrap_or(now);
            update = update.col_expr(Column::CompletedAt, Expr::value(completed_at.timestamp()));
        }

        let result = update
            .filter(Column::Id.eq(id))
            .filter(Column::Status.eq(current.status.as_str()))
            .exec(&txn)
            .await
            .map_err(|e| map_write_err("更新报名状态失败", e))?;

        if result.rows_affected == 0 {
            return Ok(StatusTransition::InvalidStatus(current.status));
        }

        let updated = Enrollments::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| OnsiteError::database_operation(format!("查询报名失败: {e}")))?
            .ok_or_else(|| OnsiteError::database_operation("更新后的报名记录不存在"))?;

        txn.commit()
            .await
            .map_err(|e| OnsiteError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(StatusTransition::Applied(updated.into_enrollment()))
    }

    /// 统计课程已占用名额
    pub async fn count_course_seats_taken_impl(&self, course_id: i64) -> Result<u64> {
        count_seats_taken(&self.db, course_id).await
    }

    /// 按状态统计报名数量，未出现的状态计为 0
    pub async fn count_enrollments_by_status_impl(
        &self,
    ) -> Result<HashMap<EnrollmentStatus, u64>> {
        let mut counts = HashMap::new();

        for status in EnrollmentStatus::all() {
            let count = Enrollments::find()
                .filter(Column::Status.eq(status.as_str()))
                .count(&self.db)
                .await
                .map_err(|e| {
                    OnsiteError::database_operation(format!("统计报名状态失败: {e}"))
                })?;
            counts.insert(*status, count);
        }

        Ok(counts)
    }

    /// 删除报名
    pub async fn delete_enrollment_impl(&self, id: i64) -> Result<bool> {
        let result = Enrollments::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| OnsiteError::database_operation(format!("删除报名失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

/// 统计占用名额（已通过 + 已结业）的报名数
async fn count_seats_taken<C: ConnectionTrait>(conn: &C, course_id: i64) -> Result<u64> {
    let statuses: Vec<&str> = EnrollmentStatus::seat_holding()
        .iter()
        .map(|s| s.as_str())
        .collect();

    Enrollments::find()
        .filter(Column::CourseId.eq(course_id))
        .filter(Column::Status.is_in(statuses))
        .count(conn)
        .await
        .map_err(|e| OnsiteError::database_operation(format!("统计课程名额失败: {e}")))
}

#[cfg(test)]
mod tests {
    use super::super::SeaOrmStorage;
    use super::super::test_support::in_memory_storage;
    use crate::models::courses::requests::CourseCreate;
    use crate::models::enrollments::entities::{Enrollment, EnrollmentStatus, StatusTransition};
    use crate::models::enrollments::requests::{
        EnrollmentCreate, EnrollmentListQuery, EnrollmentStatusChange,
    };
    use crate::models::students::requests::StudentCreate;

    async fn seed(storage: &SeaOrmStorage) -> (i64, i64) {
        let student = storage
            .create_student_impl(StudentCreate {
                first_name: "Lin".to_string(),
                last_name: "Wei".to_string(),
                email: "lin.wei@example.com".to_string(),
                employee_id: Some("EMP-1".to_string()),
                department: None,
            })
            .await
            .unwrap();
        let course = storage
            .create_course_impl(CourseCreate {
                title: "Crane Operation".to_string(),
                description: None,
                instructor: None,
                location: None,
                starts_at: None,
                ends_at: None,
                capacity: Some(1),
                lms_course_id: None,
            })
            .await
            .unwrap();
        (student.id, course.id)
    }

    fn enroll(student_id: i64, course_id: i64) -> EnrollmentCreate {
        EnrollmentCreate {
            student_id,
            course_id,
            note: None,
        }
    }

    #[tokio::test]
    async fn test_create_is_pending_and_unique() {
        let storage = in_memory_storage().await;
        let (student_id, course_id) = seed(&storage).await;

        let enrollment = storage
            .create_enrollment_impl(enroll(student_id, course_id))
            .await
            .unwrap();
        assert_eq!(enrollment.status, EnrollmentStatus::Pending);
        assert!(enrollment.reviewed_at.is_none());

        let err = storage
            .create_enrollment_impl(enroll(student_id, course_id))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E007");
    }

    #[tokio::test]
    async fn test_unknown_student_is_rejected() {
        let storage = in_memory_storage().await;
        let (_, course_id) = seed(&storage).await;

        let err = storage
            .create_enrollment_impl(enroll(4242, course_id))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E005");
    }

    #[tokio::test]
    async fn test_status_change_and_counts() {
        let storage = in_memory_storage().await;
        let (student_id, course_id) = seed(&storage).await;
        let enrollment = storage
            .create_enrollment_impl(enroll(student_id, course_id))
            .await
            .unwrap();

        assert_eq!(storage.count_course_seats_taken_impl(course_id).await.unwrap(), 0);

        let approved = storage
            .transition_enrollment_status_impl(
                enrollment.id,
                EnrollmentStatusChange {
                    status: EnrollmentStatus::Approved,
                    reviewed_by: Some("coordinator".to_string()),
                    note: None,
                    completed_at: None,
                },
            )
            .await
            .unwrap();
        let StatusTransition::Applied(approved) = approved else {
            panic!("approval should apply, got {approved:?}");
        };
        assert_eq!(approved.status, EnrollmentStatus::Approved);
        assert_eq!(approved.reviewed_by.as_deref(), Some("coordinator"));
        assert!(approved.reviewed_at.is_some());
        assert_eq!(storage.count_course_seats_taken_impl(course_id).await.unwrap(), 1);

        let completed = storage
            .transition_enrollment_status_impl(
                enrollment.id,
                EnrollmentStatusChange {
                    status: EnrollmentStatus::Completed,
                    reviewed_by: None,
                    note: None,
                    completed_at: None,
                },
            )
            .await
            .unwrap();
        let StatusTransition::Applied(completed) = completed else {
            panic!("completion should apply, got {completed:?}");
        };
        assert!(completed.completed_at.is_some());
        assert_eq!(completed.reviewed_by.as_deref(), Some("coordinator"));
        assert_eq!(storage.count_course_seats_taken_impl(course_id).await.unwrap(), 1);

        let counts = storage.count_enrollments_by_status_impl().await.unwrap();
        assert_eq!(counts[&EnrollmentStatus::Completed], 1);
        assert_eq!(counts[&EnrollmentStatus::Pending], 0);

        let query = EnrollmentListQuery {
            status: Some(EnrollmentStatus::Completed),
            course_id: Some(course_id),
            ..Default::default()
        };
        let page = storage
            .list_enrollments_with_pagination_impl(query)
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 1);
    }

    fn change(status: EnrollmentStatus) -> EnrollmentStatusChange {
        EnrollmentStatusChange {
            status,
            reviewed_by: Some("coordinator".to_string()),
            note: None,
            completed_at: None,
        }
    }

    async fn second_enrollment(storage: &SeaOrmStorage, course_id: i64) -> Enrollment {
        let student = storage
            .create_student_impl(StudentCreate {
                first_name: "Zhao".to_string(),
                last_name: "Min".to_string(),
                email: "zhao.min@example.com".to_string(),
                employee_id: None,
                department: None,
            })
            .await
            .unwrap();
        storage
            .create_enrollment_impl(enroll(student.id, course_id))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_transition_rules_and_capacity() {
        let storage = in_memory_storage().await;
        let (student_id, course_id) = seed(&storage).await;
        let first = storage
            .create_enrollment_impl(enroll(student_id, course_id))
            .await
            .unwrap();
        let second = second_enrollment(&storage, course_id).await;

        assert_eq!(
            storage
                .transition_enrollment_status_impl(4242, change(EnrollmentStatus::Approved))
                .await
                .unwrap(),
            StatusTransition::NotFound
        );
        assert_eq!(
            storage
                .transition_enrollment_status_impl(first.id, change(EnrollmentStatus::Completed))
                .await
                .unwrap(),
            StatusTransition::InvalidStatus(EnrollmentStatus::Pending)
        );

        let result = storage
            .transition_enrollment_status_impl(first.id, change(EnrollmentStatus::Approved))
            .await
            .unwrap();
        assert!(matches!(result, StatusTransition::Applied(_)));

        // 名额为 1，第二条通过被拒绝且状态不变
        assert_eq!(
            storage
                .transition_enrollment_status_impl(second.id, change(EnrollmentStatus::Approved))
                .await
                .unwrap(),
            StatusTransition::CourseFull("Crane Operation".to_string())
        );
        let unchanged = storage.get_enrollment_by_id_impl(second.id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, EnrollmentStatus::Pending);

        // 取消后释放名额
        let result = storage
            .transition_enrollment_status_impl(first.id, change(EnrollmentStatus::Cancelled))
            .await
            .unwrap();
        assert!(matches!(result, StatusTransition::Applied(_)));
        assert_eq!(storage.count_course_seats_taken_impl(course_id).await.unwrap(), 0);

        let result = storage
            .transition_enrollment_status_impl(second.id, change(EnrollmentStatus::Approved))
            .await
            .unwrap();
        assert!(matches!(result, StatusTransition::Applied(_)));
    }

    #[tokio::test]
    async fn test_concurrent_approvals_respect_capacity() {
        let storage = in_memory_storage().await;
        let (student_id, course_id) = seed(&storage).await;
        let first = storage
            .create_enrollment_impl(enroll(student_id, course_id))
            .await
            .unwrap();
        let second = second_enrollment(&storage, course_id).await;

        let (a, b) = tokio::join!(
            storage.transition_enrollment_status_impl(first.id, change(EnrollmentStatus::Approved)),
            storage.transition_enrollment_status_impl(second.id, change(EnrollmentStatus::Approved)),
        );
        let outcomes = [a.unwrap(), b.unwrap()];

        let applied = outcomes
            .iter()
            .filter(|o| matches!(o, StatusTransition::Applied(_)))
            .count();
        let full = outcomes
            .iter()
            .filter(|o| matches!(o, StatusTransition::CourseFull(_)))
            .count();
        assert_eq!((applied, full), (1, 1));
        assert_eq!(storage.count_course_seats_taken_impl(course_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_approve_and_reject_apply_once() {
        let storage = in_memory_storage().await;
        let (student_id, course_id) = seed(&storage).await;
        let enrollment = storage
            .create_enrollment_impl(enroll(student_id, course_id))
            .await
            .unwrap();

        let (a, b) = tokio::join!(
            storage.transition_enrollment_status_impl(enrollment.id, change(EnrollmentStatus::Approved)),
            storage.transition_enrollment_status_impl(enrollment.id, change(EnrollmentStatus::Rejected)),
        );
        let outcomes = [a.unwrap(), b.unwrap()];

        let applied: Vec<_> = outcomes
            .iter()
            .filter_map(|o| match o {
                StatusTransition::Applied(e) => Some(e.status),
                _ => None,
            })
            .collect();
        assert_eq!(applied.len(), 1);
        assert!(
            outcomes
                .iter()
                .any(|o| matches!(o, StatusTransition::InvalidStatus(_)))
        );

        let stored = storage.get_enrollment_by_id_impl(enrollment.id).await.unwrap().unwrap();
        assert_eq!(stored.status, applied[0]);
    }

    #[tokio::test]
    async fn test_course_delete_cascades() {
        let storage = in_memory_storage().await;
        let (student_id, course_id) = seed(&storage).await;
        let enrollment = storage
            .create_enrollment_impl(enroll(student_id, course_id))
            .await
            .unwrap();

        assert!(storage.delete_course_impl(course_id).await.unwrap());
        assert!(
            storage
                .get_enrollment_by_id_impl(enrollment.id)
                .await
                .unwrap()
                .is_none()
        );
    }
}
