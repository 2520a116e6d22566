use serde::Deserialize;
use ts_rs::TS;

use crate::errors::Result;
use crate::models::common::deserialize_non_blank;
use crate::utils::validate::{limit_text, require_text};

const MAX_COMMENT_CHARS: usize = 4000;
const MAX_AUTHOR_CHARS: usize = 128;

// 创建课程评论请求
//
// 只接受 `comment` 与 `created_by` 两个字段；`id`、`course_id`、`created_at`
// 由服务端在持久化时生成，不允许调用方提供。
#[derive(Debug, Clone, PartialEq, Deserialize, TS)]
#[serde(deny_unknown_fields)]
#[ts(export, export_to = "course_comment.ts")]
pub struct CourseCommentCreate {
    #[serde(deserialize_with = "deserialize_non_blank")]
    pub comment: String,
    #[serde(deserialize_with = "deserialize_non_blank")]
    pub created_by: String,
}

impl CourseCommentCreate {
    /// 构造并校验，字段原样保留
    pub fn new(comment: impl Into<String>, created_by: impl Into<String>) -> Result<Self> {
        let request = Self {
            comment: comment.into(),
            created_by: created_by.into(),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<()> {
        require_text("comment", &self.comment)?;
        require_text("created_by", &self.created_by)?;
        limit_text("comment", &self.comment, MAX_COMMENT_CHARS)?;
        limit_text("created_by", &self.created_by, MAX_AUTHOR_CHARS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_fields_unchanged() {
        let pairs = [
            ("Great course", "admin"),
            ("  padded but fine  ", "trainer-07"),
            ("多语言评论", "张三"),
        ];
        for (comment, author) in pairs {
            let req = CourseCommentCreate::new(comment, author).unwrap();
            assert_eq!(req.comment, comment);
            assert_eq!(req.created_by, author);
        }
    }

    #[test]
    fn test_new_rejects_blank_fields() {
        assert!(CourseCommentCreate::new("", "admin").is_err());
        assert!(CourseCommentCreate::new("   ", "admin").is_err());
        assert!(CourseCommentCreate::new("Great course", "").is_err());
    }

    #[test]
    fn test_new_rejects_oversized_comment() {
        let long = "x".repeat(MAX_COMMENT_CHARS + 1);
        let err = CourseCommentCreate::new(long, "admin").unwrap_err();
        assert_eq!(err.code(), "E005");
    }

    #[test]
    fn test_deserialize_valid() {
        let req: CourseCommentCreate =
            serde_json::from_str(r#"{"comment":"Great course","created_by":"admin"}"#).unwrap();
        assert_eq!(req.comment, "Great course");
        assert_eq!(req.created_by, "admin");
    }

    #[test]
    fn test_deserialize_rejects_invalid_payloads() {
        let invalid = [
            r#"{"comment":"","created_by":"admin"}"#,
            r#"{"comment":"Great course"}"#,
            r#"{"created_by":"admin"}"#,
            r#"{"comment":5,"created_by":"admin"}"#,
            r#"{"comment":"Great course","created_by":["admin"]}"#,
            r#"{"comment":"Great course","created_by":null}"#,
            r#"{"comment":"Great course","created_by":"admin","id":1}"#,
        ];
        for payload in invalid {
            assert!(
                serde_json::from_str::<CourseCommentCreate>(payload).is_err(),
                "payload should be rejected: {payload}"
            );
        }
    }
}
