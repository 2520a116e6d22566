//! 学员存储操作

use std::collections::HashMap;

use super::{SeaOrmStorage, map_write_err, non_empty};
use crate::entity::students::{ActiveModel, Column, Entity as Students};
use crate::errors::{OnsiteError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    students::{
        entities::Student,
        requests::{StudentCreate, StudentListQuery, StudentUpdate},
    },
};
use crate::utils::contains_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

impl SeaOrmStorage {
    /// 创建学员
    pub async fn create_student_impl(&self, req: StudentCreate) -> Result<Student> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            first_name: Set(req.first_name.trim().to_string()),
            last_name: Set(req.last_name.trim().to_string()),
            email: Set(req.email.trim().to_lowercase()),
            employee_id: Set(non_empty(req.employee_id)),
            department: Set(non_empty(req.department)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_err("创建学员失败", e))?;

        Ok(result.into_student())
    }

    /// 通过 ID 获取学员
    pub async fn get_student_by_id_impl(&self, id: i64) -> Result<Option<Student>> {
        let result = Students::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| OnsiteError::database_operation(format!("查询学员失败: {e}")))?;

        Ok(result.map(|m| m.into_student()))
    }

    /// 通过邮箱获取学员（邮箱统一小写存储）
    pub async fn get_student_by_email_impl(&self, email: &str) -> Result<Option<Student>> {
        let result = Students::find()
            .filter(Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
            .map_err(|e| OnsiteError::database_operation(format!("查询学员失败: {e}")))?;

        Ok(result.map(|m| m.into_student()))
    }

    /// 通过工号获取学员
    pub async fn get_student_by_employee_id_impl(
        &self,
        employee_id: &str,
    ) -> Result<Option<Student>> {
        let result = Students::find()
            .filter(Column::EmployeeId.eq(employee_id.trim()))
            .one(&self.db)
            .await
            .map_err(|e| OnsiteError::database_operation(format!("查询学员失败: {e}")))?;

        Ok(result.map(|m| m.into_student()))
    }

    /// 批量按邮箱查询学员
    pub async fn find_students_by_emails_impl(
        &self,
        emails: &[String],
    ) -> Result<HashMap<String, Student>> {
        if emails.is_empty() {
            return Ok(HashMap::new());
        }

        let normalized: Vec<String> = emails.iter().map(|e| e.trim().to_lowercase()).collect();

        let students = Students::find()
            .filter(Column::Email.is_in(normalized))
            .all(&self.db)
            .await
            .map_err(|e| OnsiteError::database_operation(format!("批量查询学员失败: {e}")))?;

        Ok(students
            .into_iter()
            .map(|m| (m.email.clone(), m.into_student()))
            .collect())
    }

    /// 分页列出学员
    pub async fn list_students_with_pagination_impl(
        &self,
        query: StudentListQuery,
    ) -> Result<PaginatedResponse<Student>> {
        let (page, size) = query.pagination.normalized();

        let mut select = Students::find();

        // 搜索条件
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let search = search.trim();
            select = select.filter(
                Condition::any()
                    .add(Column::FirstName.like(contains_pattern(search)))
                    .add(Column::LastName.like(contains_pattern(search)))
                    .add(Column::Email.like(contains_pattern(search)))
                    .add(Column::EmployeeId.like(contains_pattern(search))),
            );
        }

        // 部门筛选
        if let Some(ref department) = query.department
            && !department.trim().is_empty()
        {
            select = select.filter(Column::Department.eq(department.trim()));
        }

        // 排序
        select = select
            .order_by_asc(Column::LastName)
            .order_by_asc(Column::FirstName);

        // 分页查询
        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| OnsiteError::database_operation(format!("查询学员总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| OnsiteError::database_operation(format!("查询学员页数失败: {e}")))?;

        let students = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| OnsiteError::database_operation(format!("查询学员列表失败: {e}")))?;

        Ok(PaginatedResponse {
            items: students.into_iter().map(|m| m.into_student()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 更新学员信息
    pub async fn update_student_impl(
        &self,
        id: i64,
        update: StudentUpdate,
    ) -> Result<Option<Student>> {
        // 先检查学员是否存在
        let existing = self.get_student_by_id_impl(id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(first_name) = update.first_name {
            model.first_name = Set(first_name.trim().to_string());
        }

        if let Some(last_name) = update.last_name {
            model.last_name = Set(last_name.trim().to_string());
        }

        if let Some(email) = update.email {
            model.email = Set(email.trim().to_lowercase());
        }

        if update.employee_id.is_some() {
            model.employee_id = Set(non_empty(update.employee_id));
        }

        if update.department.is_some() {
            model.department = Set(non_empty(update.department));
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| map_write_err("更新学员失败", e))?;

        Ok(Some(result.into_student()))
    }

    /// 删除学员
    pub async fn delete_student_impl(&self, id: i64) -> Result<bool> {
        let result = Students::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| OnsiteError::database_operation(format!("删除学员失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::in_memory_storage;
    use crate::models::students::requests::{StudentCreate, StudentListQuery, StudentUpdate};

    fn student(first: &str, last: &str, email: &str) -> StudentCreate {
        StudentCreate {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            employee_id: None,
            department: Some("Assembly".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup_by_email() {
        let storage = in_memory_storage().await;
        let created = storage
            .create_student_impl(student("Grace", "Hopper", "Grace@Example.com"))
            .await
            .unwrap();

        assert_eq!(created.email, "grace@example.com");

        let found = storage
            .get_student_by_email_impl("GRACE@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let storage = in_memory_storage().await;
        storage
            .create_student_impl(student("Alan", "Turing", "alan@example.com"))
            .await
            .unwrap();

        let err = storage
            .create_student_impl(student("Alan", "T.", "alan@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E007");
    }

    #[tokio::test]
    async fn test_list_search_and_update() {
        let storage = in_memory_storage().await;
        let ada = storage
            .create_student_impl(student("Ada", "Lovelace", "ada@example.com"))
            .await
            .unwrap();
        storage
            .create_student_impl(student("Edsger", "Dijkstra", "edsger@example.com"))
            .await
            .unwrap();

        let query = StudentListQuery {
            search: Some("love".to_string()),
            ..Default::default()
        };
        let page = storage.list_students_with_pagination_impl(query).await.unwrap();
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.items[0].id, ada.id);

        let updated = storage
            .update_student_impl(
                ada.id,
                StudentUpdate {
                    department: Some(String::new()),
                    employee_id: Some("EMP-9".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.department, None);
        assert_eq!(updated.employee_id.as_deref(), Some("EMP-9"));

        assert!(
            storage
                .update_student_impl(9999, StudentUpdate::default())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_find_students_by_emails() {
        let storage = in_memory_storage().await;
        storage
            .create_student_impl(student("Ada", "Lovelace", "ada@example.com"))
            .await
            .unwrap();

        let found = storage
            .find_students_by_emails_impl(&["ADA@example.com".to_string(), "nobody@x.io".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(found.contains_key("ada@example.com"));
    }
}
