use serde::Deserialize;
use std::collections::HashSet;
use ts_rs::TS;

use super::entities::EnrollmentStatus;
use crate::errors::{OnsiteError, Result};
use crate::models::common::{PaginationQuery, deserialize_non_blank, deserialize_optional_i64};
use crate::utils::validate::limit_text;

/// 单次批量审批的最大条数
pub const MAX_BULK_APPROVAL: usize = 200;

// 报名列表查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct EnrollmentListQuery {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub status: Option<EnrollmentStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub course_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub student_id: Option<i64>,
}

// 创建报名请求，新报名一律为待审批
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct EnrollmentCreate {
    pub student_id: i64,
    pub course_id: i64,
    pub note: Option<String>,
}

impl EnrollmentCreate {
    pub fn validate(&self) -> Result<()> {
        if self.student_id <= 0 || self.course_id <= 0 {
            return Err(OnsiteError::validation(
                "student_id and course_id must be positive",
            ));
        }
        if let Some(ref note) = self.note {
            limit_text("note", note, 1000)?;
        }
        Ok(())
    }
}

// 审批请求：approved = true 通过，false 拒绝
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct EnrollmentApproval {
    pub approved: bool,
    #[serde(deserialize_with = "deserialize_non_blank")]
    pub reviewed_by: String,
    pub note: Option<String>,
}

impl EnrollmentApproval {
    pub fn target_status(&self) -> EnrollmentStatus {
        if self.approved {
            EnrollmentStatus::Approved
        } else {
            EnrollmentStatus::Rejected
        }
    }
}

// 取消请求：待审批或已通过的报名可取消，已通过的取消后释放名额
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct EnrollmentCancel {
    #[serde(deserialize_with = "deserialize_non_blank")]
    pub cancelled_by: String,
    pub note: Option<String>,
}

// 批量审批通过请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct BulkEnrollmentApproval {
    pub enrollment_ids: Vec<i64>,
    #[serde(deserialize_with = "deserialize_non_blank")]
    pub reviewed_by: String,
}

impl BulkEnrollmentApproval {
    pub fn validate(&self) -> Result<()> {
        if self.enrollment_ids.is_empty() {
            return Err(OnsiteError::validation("enrollment_ids must not be empty"));
        }
        if self.enrollment_ids.len() > MAX_BULK_APPROVAL {
            return Err(OnsiteError::validation(format!(
                "At most {MAX_BULK_APPROVAL} enrollments can be approved at once"
            )));
        }
        if self.enrollment_ids.iter().any(|id| *id <= 0) {
            return Err(OnsiteError::validation("enrollment_ids must be positive"));
        }
        let unique: HashSet<_> = self.enrollment_ids.iter().collect();
        if unique.len() != self.enrollment_ids.len() {
            return Err(OnsiteError::validation(
                "enrollment_ids must not contain duplicates",
            ));
        }
        Ok(())
    }
}

/// 存储层状态变更参数
#[derive(Debug, Clone)]
pub struct EnrollmentStatusChange {
    pub status: EnrollmentStatus,
    pub reviewed_by: Option<String>,
    pub note: Option<String>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bulk(ids: Vec<i64>) -> BulkEnrollmentApproval {
        BulkEnrollmentApproval {
            enrollment_ids: ids,
            reviewed_by: "coordinator".to_string(),
        }
    }

    #[test]
    fn test_bulk_validation() {
        assert!(bulk(vec![1, 2, 3]).validate().is_ok());
        assert!(bulk(vec![]).validate().is_err());
        assert!(bulk(vec![1, 1]).validate().is_err());
        assert!(bulk(vec![0]).validate().is_err());
        assert!(bulk((1..=201).collect()).validate().is_err());
    }

    #[test]
    fn test_approval_target_status() {
        let approval: EnrollmentApproval =
            serde_json::from_str(r#"{"approved":false,"reviewed_by":"lead"}"#).unwrap();
        assert_eq!(approval.target_status(), EnrollmentStatus::Rejected);
        assert!(
            serde_json::from_str::<EnrollmentApproval>(r#"{"approved":true,"reviewed_by":""}"#)
                .is_err()
        );
    }

    #[test]
    fn test_create_validation() {
        let req = EnrollmentCreate {
            student_id: 1,
            course_id: -2,
            note: None,
        };
        assert!(req.validate().is_err());
    }
}
