//! 课程存储操作

use super::{SeaOrmStorage, map_write_err, non_empty};
use crate::entity::courses::{ActiveModel, Column, Entity as Courses};
use crate::errors::{OnsiteError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    courses::{
        entities::Course,
        requests::{CourseCreate, CourseListQuery, CourseUpdate},
    },
};
use crate::utils::contains_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

impl SeaOrmStorage {
    /// 创建课程
    pub async fn create_course_impl(&self, req: CourseCreate) -> Result<Course> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            title: Set(req.title.trim().to_string()),
            description: Set(non_empty(req.description)),
            instructor: Set(non_empty(req.instructor)),
            location: Set(non_empty(req.location)),
            starts_at: Set(req.starts_at.map(|t| t.timestamp())),
            ends_at: Set(req.ends_at.map(|t| t.timestamp())),
            capacity: Set(req.capacity),
            lms_course_id: Set(non_empty(req.lms_course_id)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_err("创建课程失败", e))?;

        Ok(result.into_course())
    }

    /// 通过 ID 获取课程
    pub async fn get_course_by_id_impl(&self, id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| OnsiteError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    /// 通过标题获取课程
    pub async fn get_course_by_title_impl(&self, title: &str) -> Result<Option<Course>> {
        let result = Courses::find()
            .filter(Column::Title.eq(title.trim()))
            .one(&self.db)
            .await
            .map_err(|e| OnsiteError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    /// 分页列出课程，按开课时间排序
    pub async fn list_courses_with_pagination_impl(
        &self,
        query: CourseListQuery,
    ) -> Result<PaginatedResponse<Course>> {
        let (page, size) = query.pagination.normalized();

        let mut select = Courses::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let search = search.trim();
            select = select.filter(
                Condition::any()
                    .add(Column::Title.like(contains_pattern(search)))
                    .add(Column::Instructor.like(contains_pattern(search)))
                    .add(Column::Location.like(contains_pattern(search))),
            );
        }

        select = select
            .order_by_desc(Column::StartsAt)
            .order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| OnsiteError::database_operation(format!("查询课程总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| OnsiteError::database_operation(format!("查询课程页数失败: {e}")))?;

        let courses = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| OnsiteError::database_operation(format!("查询课程列表失败: {e}")))?;

        Ok(PaginatedResponse {
            items: courses.into_iter().map(|m| m.into_course()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 更新课程信息
    pub async fn update_course_impl(
        &self,
        id: i64,
        update: CourseUpdate,
    ) -> Result<Option<Course>> {
        let existing = self.get_course_by_id_impl(id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(title) = update.title {
            model.title = Set(title.trim().to_string());
        }

        if update.description.is_some() {
            model.description = Set(non_empty(update.description));
        }

        if update.instructor.is_some() {
            model.instructor = Set(non_empty(update.instructor));
        }

        if update.location.is_some() {
            model.location = Set(non_empty(update.location));
        }

        if let Some(starts_at) = update.starts_at {
            model.starts_at = Set(Some(starts_at.timestamp()));
        }

        if let Some(ends_at) = update.ends_at {
            model.ends_at = Set(Some(ends_at.timestamp()));
        }

        if let Some(capacity) = update.capacity {
            model.capacity = Set(Some(capacity));
        }

        if update.lms_course_id.is_some() {
            model.lms_course_id = Set(non_empty(update.lms_course_id));
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| map_write_err("更新课程失败", e))?;

        Ok(Some(result.into_course()))
    }

    /// 删除课程，报名与评论随外键级联删除
    pub async fn delete_course_impl(&self, id: i64) -> Result<bool> {
        let result = Courses::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| OnsiteError::database_operation(format!("删除课程失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::in_memory_storage;
    use crate::models::courses::requests::{CourseCreate, CourseListQuery, CourseUpdate};

    fn course(title: &str) -> CourseCreate {
        CourseCreate {
            title: title.to_string(),
            description: None,
            instructor: Some("R. Diaz".to_string()),
            location: Some("Hall B".to_string()),
            starts_at: None,
            ends_at: None,
            capacity: Some(2),
            lms_course_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_get_and_duplicate_title() {
        let storage = in_memory_storage().await;
        let created = storage
            .create_course_impl(course("Lockout / Tagout"))
            .await
            .unwrap();

        let by_title = storage
            .get_course_by_title_impl("Lockout / Tagout")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_title.id, created.id);

        let err = storage
            .create_course_impl(course("Lockout / Tagout"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E007");
    }

    #[tokio::test]
    async fn test_search_escapes_wildcards() {
        let storage = in_memory_storage().await;
        storage.create_course_impl(course("100% Uptime")).await.unwrap();
        storage.create_course_impl(course("1000 Hours")).await.unwrap();

        let query = CourseListQuery {
            search: Some("100%".to_string()),
            ..Default::default()
        };
        let page = storage.list_courses_with_pagination_impl(query).await.unwrap();
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.items[0].title, "100% Uptime");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let storage = in_memory_storage().await;
        let created = storage.create_course_impl(course("Welding I")).await.unwrap();

        let updated = storage
            .update_course_impl(
                created.id,
                CourseUpdate {
                    capacity: Some(20),
                    location: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.capacity, Some(20));
        assert_eq!(updated.location, None);
        assert_eq!(updated.instructor.as_deref(), Some("R. Diaz"));

        assert!(storage.delete_course_impl(created.id).await.unwrap());
        assert!(!storage.delete_course_impl(created.id).await.unwrap());
        assert!(storage.get_course_by_id_impl(created.id).await.unwrap().is_none());
    }
}
