//! 课程评论存储操作

use super::{SeaOrmStorage, map_write_err};
use crate::entity::course_comments::{ActiveModel, Column, Entity as CourseComments};
use crate::errors::{OnsiteError, Result};
use crate::models::course_comments::{
    requests::CourseCommentCreate, responses::CourseCommentResponse,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 创建课程评论，id 与 created_at 由存储层生成
    pub async fn create_course_comment_impl(
        &self,
        course_id: i64,
        req: CourseCommentCreate,
    ) -> Result<CourseCommentResponse> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            course_id: Set(course_id),
            comment: Set(req.comment),
            created_by: Set(req.created_by),
            created_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_err("创建课程评论失败", e))?;

        Ok(result.into_course_comment())
    }

    /// 列出课程评论，新的在前
    pub async fn list_course_comments_impl(
        &self,
        course_id: i64,
    ) -> Result<Vec<CourseCommentResponse>> {
        let comments = CourseComments::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| OnsiteError::database_operation(format!("查询课程评论失败: {e}")))?;

        Ok(comments
            .into_iter()
            .map(|m| m.into_course_comment())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::in_memory_storage;
    use crate::models::course_comments::requests::CourseCommentCreate;
    use crate::models::courses::requests::CourseCreate;

    #[tokio::test]
    async fn test_create_and_list_comments() {
        let storage = in_memory_storage().await;
        let course = storage
            .create_course_impl(CourseCreate {
                title: "First Aid".to_string(),
                description: None,
                instructor: None,
                location: None,
                starts_at: None,
                ends_at: None,
                capacity: None,
                lms_course_id: None,
            })
            .await
            .unwrap();

        let first = storage
            .create_course_comment_impl(
                course.id,
                CourseCommentCreate::new("Great course", "admin").unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(first.course_id, course.id);
        assert_eq!(first.comment, "Great course");
        assert_eq!(first.created_by, "admin");

        let second = storage
            .create_course_comment_impl(
                course.id,
                CourseCommentCreate::new("Bring gloves", "trainer").unwrap(),
            )
            .await
            .unwrap();
        assert!(second.id > first.id);

        let comments = storage.list_course_comments_impl(course.id).await.unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].id, second.id);
        assert_eq!(comments[1], first);

        assert!(storage.delete_course_impl(course.id).await.unwrap());
        assert!(storage.list_course_comments_impl(course.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_comment_for_missing_course_fails() {
        let storage = in_memory_storage().await;
        let result = storage
            .create_course_comment_impl(
                77,
                CourseCommentCreate::new("Orphan", "admin").unwrap(),
            )
            .await;
        assert!(result.is_err());
    }
}
