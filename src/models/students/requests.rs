use crate::errors::{OnsiteError, Result};
use crate::models::common::PaginationQuery;
use crate::utils::validate::{limit_text, require_text, validate_email, validate_employee_id};
use serde::Deserialize;
use ts_rs::TS;

const MAX_NAME_CHARS: usize = 64;

// 学员列表查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "student.ts")]
pub struct StudentListQuery {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    // 按姓名 / 邮箱 / 工号模糊搜索
    pub search: Option<String>,
    pub department: Option<String>,
}

// 创建学员请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "student.ts")]
pub struct StudentCreate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub employee_id: Option<String>,
    pub department: Option<String>,
}

impl StudentCreate {
    pub fn validate(&self) -> Result<()> {
        validate_name("first_name", &self.first_name)?;
        validate_name("last_name", &self.last_name)?;
        validate_email(&self.email).map_err(OnsiteError::validation)?;
        if let Some(ref employee_id) = self.employee_id {
            validate_employee_id(employee_id).map_err(OnsiteError::validation)?;
        }
        Ok(())
    }
}

// 更新学员请求
//
// `employee_id` / `department` 传空字符串表示清空
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "student.ts")]
pub struct StudentUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub employee_id: Option<String>,
    pub department: Option<String>,
}

impl StudentUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(ref first_name) = self.first_name {
            validate_name("first_name", first_name)?;
        }
        if let Some(ref last_name) = self.last_name {
            validate_name("last_name", last_name)?;
        }
        if let Some(ref email) = self.email {
            validate_email(email).map_err(OnsiteError::validation)?;
        }
        if let Some(ref employee_id) = self.employee_id
            && !employee_id.is_empty()
        {
            validate_employee_id(employee_id).map_err(OnsiteError::validation)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.employee_id.is_none()
            && self.department.is_none()
    }
}

fn validate_name(field: &str, value: &str) -> Result<()> {
    require_text(field, value)?;
    limit_text(field, value, MAX_NAME_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StudentCreate {
        StudentCreate {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            employee_id: Some("EMP-001".to_string()),
            department: Some("Maintenance".to_string()),
        }
    }

    #[test]
    fn test_create_valid() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_create_rejects_bad_email() {
        let mut req = sample();
        req.email = "ada-at-example".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_rejects_blank_name() {
        let mut req = sample();
        req.last_name = " ".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_update_allows_clearing_employee_id() {
        let update = StudentUpdate {
            employee_id: Some(String::new()),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
        assert!(!update.is_empty());
        assert!(StudentUpdate::default().is_empty());
    }
}
