//! 课程评论实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "course_comments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    #[sea_orm(column_type = "Text")]
    pub comment: String,
    pub created_by: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Course,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型逐字段转换为响应模型
impl Model {
    pub fn into_course_comment(self) -> crate::models::course_comments::responses::CourseCommentResponse {
        use crate::models::course_comments::responses::CourseCommentResponse;
        use chrono::{DateTime, Utc};

        CourseCommentResponse {
            id: self.id,
            course_id: self.course_id,
            comment: self.comment,
            created_by: self.created_by,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_into_course_comment_maps_every_field() {
        let created_at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap();
        let record = Model {
            id: 1,
            course_id: 5,
            comment: "Great course".to_string(),
            created_by: "admin".to_string(),
            created_at: created_at.timestamp(),
        };

        let response = record.into_course_comment();

        assert_eq!(response.id, 1);
        assert_eq!(response.course_id, 5);
        assert_eq!(response.comment, "Great course");
        assert_eq!(response.created_by, "admin");
        assert_eq!(response.created_at, created_at);
    }

    #[test]
    fn test_response_serializes_exact_field_names() {
        let record = Model {
            id: 2,
            course_id: 9,
            comment: "Bring gloves".to_string(),
            created_by: "trainer".to_string(),
            created_at: 1_700_000_000,
        };

        let json = serde_json::to_value(record.into_course_comment()).unwrap();
        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["comment", "course_id", "created_at", "created_by", "id"]
        );
    }
}
