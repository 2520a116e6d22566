use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 报名状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "enrollment.ts")]
pub enum EnrollmentStatus {
    Pending,   // 待审批
    Approved,  // 已通过
    Rejected,  // 已拒绝
    Completed, // 已结业
    Cancelled, // 已取消
}

impl EnrollmentStatus {
    pub const PENDING: &'static str = "pending";
    pub const APPROVED: &'static str = "approved";
    pub const REJECTED: &'static str = "rejected";
    pub const COMPLETED: &'static str = "completed";
    pub const CANCELLED: &'static str = "cancelled";

    pub fn all() -> &'static [EnrollmentStatus] {
        &[
            Self::Pending,
            Self::Approved,
            Self::Rejected,
            Self::Completed,
            Self::Cancelled,
        ]
    }

    /// 占用课程名额的状态
    pub fn seat_holding() -> &'static [EnrollmentStatus] {
        &[Self::Approved, Self::Completed]
    }

    /// 状态流转规则：待审批 -> 通过 / 拒绝 / 取消，通过 -> 结业 / 取消
    pub fn can_transition_to(self, next: EnrollmentStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved)
                | (Self::Pending, Self::Rejected)
                | (Self::Pending, Self::Cancelled)
                | (Self::Approved, Self::Completed)
                | (Self::Approved, Self::Cancelled)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => Self::PENDING,
            Self::Approved => Self::APPROVED,
            Self::Rejected => Self::REJECTED,
            Self::Completed => Self::COMPLETED,
            Self::Cancelled => Self::CANCELLED,
        }
    }
}

impl<'de> Deserialize<'de> for EnrollmentStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<EnrollmentStatus>().map_err(|_| {
            serde::de::Error::custom(format!(
                "Invalid enrollment status: '{s}'. Supported: pending, approved, rejected, completed, cancelled"
            ))
        })
    }
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EnrollmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::PENDING => Ok(Self::Pending),
            Self::APPROVED => Ok(Self::Approved),
            Self::REJECTED => Ok(Self::Rejected),
            Self::COMPLETED => Ok(Self::Completed),
            Self::CANCELLED => Ok(Self::Cancelled),
            _ => Err(format!("Invalid enrollment status: {s}")),
        }
    }
}

// 报名实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct Enrollment {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub status: EnrollmentStatus,
    pub note: Option<String>,
    // 审批人
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 状态流转结果
#[derive(Debug, Clone, PartialEq)]
pub enum StatusTransition {
    Applied(Enrollment),
    NotFound,
    // 当前状态不允许流转到目标状态
    InvalidStatus(EnrollmentStatus),
    CourseNotFound,
    // 课程已满，附课程标题
    CourseFull(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_strings() {
        for status in EnrollmentStatus::all() {
            assert_eq!(status.to_string().parse::<EnrollmentStatus>(), Ok(*status));
        }
        assert!("archived".parse::<EnrollmentStatus>().is_err());
    }

    #[test]
    fn test_status_deserialize_error_message() {
        let err = serde_json::from_str::<EnrollmentStatus>(r#""archived""#).unwrap_err();
        assert!(err.to_string().contains("Invalid enrollment status"));
    }

    #[test]
    fn test_transitions() {
        use EnrollmentStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Rejected.can_transition_to(Approved));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Approved.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Approved));
    }
}
