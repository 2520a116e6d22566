use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{OnsiteError, Result};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}$").expect("Invalid email regex")
});

static EMPLOYEE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{2,32}$").expect("Invalid employee id regex"));

pub fn validate_email(email: &str) -> std::result::Result<(), &'static str> {
    // 邮箱格式校验：必须包含 @ 和 .
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

pub fn validate_employee_id(employee_id: &str) -> std::result::Result<(), &'static str> {
    // 工号：2-32 位字母、数字、下划线或连字符
    if !EMPLOYEE_ID_RE.is_match(employee_id) {
        return Err("Employee id must be 2-32 letters, digits, underscores or hyphens");
    }
    Ok(())
}

/// 必填文本字段校验（仅含空白字符视为空）
pub fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(OnsiteError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// 文本长度上限校验（按字符计）
pub fn limit_text(field: &str, value: &str, max_chars: usize) -> Result<()> {
    if value.chars().count() > max_chars {
        return Err(OnsiteError::validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(())
}
