//! 结业名单上传
//!
//! CSV 表头必须包含 `email`，可选 `completed_at`（RFC 3339 或 YYYY-MM-DD，缺省为当前时间）。
//! 每行对应课程中的一条报名：已通过的标记为结业，已结业的跳过，其余记为失败。

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{DateTime, NaiveDate, Utc};
use futures_util::StreamExt;
use std::collections::HashMap;
use std::io::Cursor;
use tracing::{error, info};

use super::EnrollmentService;
use crate::config::AppConfig;
use crate::models::{
    ApiResponse, ErrorCode,
    enrollments::{
        entities::{EnrollmentStatus, StatusTransition},
        requests::EnrollmentStatusChange,
        responses::CompletionUploadResponse,
    },
};
use crate::services::storage_error_response;
use crate::utils::validate::validate_email;

/// 名单解析错误
#[derive(Debug)]
enum CompletionParseError {
    MissingColumn(String),
    ParseFailed(String),
}

impl CompletionParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::MissingColumn(_) => ErrorCode::ImportFileMissingColumn,
            Self::ParseFailed(_) => ErrorCode::ImportFileParseFailed,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::MissingColumn(col) => format!("缺少必需列: {col}"),
            Self::ParseFailed(msg) => msg.clone(),
        }
    }
}

/// 上传读取错误
enum UploadReadError {
    TooLarge(usize),
    Invalid(String),
}

/// 名单行
#[derive(Debug, Clone, PartialEq)]
struct CompletionRow {
    row_num: usize,
    email: String,
    completed_at: String,
}

pub async fn upload_completions(
    service: &EnrollmentService,
    request: &HttpRequest,
    course_id: i64,
    mut payload: Multipart,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let upload_config = &AppConfig::get().upload;

    match storage.get_course_by_id(course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::CourseNotFound,
                "Course not found",
            )));
        }
        Err(e) => {
            return Ok(storage_error_response(
                &e,
                ErrorCode::InternalServerError,
                "Failed to get course information",
            ));
        }
    }

    // 读取文件内容
    let file_bytes = match read_file_from_multipart(&mut payload, upload_config.max_size).await {
        Ok(bytes) => bytes,
        Err(UploadReadError::TooLarge(limit)) => {
            return Ok(HttpResponse::PayloadTooLarge().json(ApiResponse::error_empty(
                ErrorCode::FileSizeExceeded,
                format!("文件大小超过限制 ({limit} 字节)"),
            )));
        }
        Err(UploadReadError::Invalid(e)) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::FileUploadFailed,
                format!("文件读取失败: {e}"),
            )));
        }
    };

    let rows = match parse_csv(&file_bytes) {
        Ok(rows) => rows,
        Err(e) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(e.error_code(), e.message())));
        }
    };

    if rows.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ImportFileDataInvalid,
            "文件中没有数据行",
        )));
    }

    if rows.len() > upload_config.max_rows {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ImportFileDataInvalid,
            format!("单次上传最多支持 {} 行", upload_config.max_rows),
        )));
    }

    // 批量查找学员
    let emails: Vec<String> = rows.iter().map(|r| r.email.clone()).collect();
    let students = match storage.find_students_by_emails(&emails).await {
        Ok(students) => students,
        Err(e) => {
            return Ok(storage_error_response(
                &e,
                ErrorCode::InternalServerError,
                "Failed to look up students",
            ));
        }
    };

    let now = Utc::now();
    let mut response = CompletionUploadResponse {
        total: rows.len(),
        ..Default::default()
    };

    for row in rows {
        if let Err(msg) = validate_email(&row.email) {
            response.record_failure(row.row_num, "email", msg.to_string());
            continue;
        }

        let completed_at = match parse_completed_at(&row.completed_at, now) {
            Ok(at) => at,
            Err(msg) => {
                response.record_failure(row.row_num, "completed_at", msg);
                continue;
            }
        };

        let Some(student) = students.get(&row.email.to_lowercase()) else {
            response.record_failure(row.row_num, "email", "学员不存在".to_string());
            continue;
        };

        let enrollment = match storage
            .get_enrollment_by_student_and_course(student.id, course_id)
            .await
        {
            Ok(Some(enrollment)) => enrollment,
            Ok(None) => {
                response.record_failure(row.row_num, "email", "该学员未报名此课程".to_string());
                continue;
            }
            Err(e) => {
                error!("查询报名失败: {}", e);
                response.record_failure(row.row_num, "", format!("查询报名失败: {e}"));
                continue;
            }
        };

        match enrollment.status {
            EnrollmentStatus::Completed => {
                response.skipped += 1;
                continue;
            }
            EnrollmentStatus::Approved => {}
            other => {
                response.record_failure(
                    row.row_num,
                    "status",
                    format!("报名状态为 {other}，只有已通过的报名可以结业"),
                );
                continue;
            }
        }

        let change = EnrollmentStatusChange {
            status: EnrollmentStatus::Completed,
            reviewed_by: None,
            note: None,
            completed_at: Some(completed_at),
        };

        match storage.transition_enrollment_status(enrollment.id, change).await {
            Ok(StatusTransition::Applied(_)) => response.completed += 1,
            // 并发上传已先一步结业
            Ok(StatusTransition::InvalidStatus(EnrollmentStatus::Completed)) => {
                response.skipped += 1
            }
            Ok(StatusTransition::InvalidStatus(current)) => response.record_failure(
                row.row_num,
                "status",
                format!("报名状态为 {current}，只有已通过的报名可以结业"),
            ),
            Ok(StatusTransition::NotFound) => {
                response.record_failure(row.row_num, "", "报名记录已被删除".to_string())
            }
            Ok(StatusTransition::CourseNotFound | StatusTransition::CourseFull(_)) => {
                response.record_failure(row.row_num, "", "课程不可用".to_string())
            }
            Err(e) => {
                error!("更新报名状态失败: {}", e);
                response.record_failure(row.row_num, "", format!("更新失败: {e}"));
            }
        }
    }

    info!(
        "Completion upload for course {}: {} completed, {} skipped, {} failed",
        course_id, response.completed, response.skipped, response.failed
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "结业名单处理完成")))
}

async fn read_file_from_multipart(
    payload: &mut Multipart,
    max_size: usize,
) -> Result<Vec<u8>, UploadReadError> {
    let mut file_bytes = Vec::new();

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| UploadReadError::Invalid(format!("读取字段失败: {e}")))?;

        if field.name().map(|n| n == "file").unwrap_or(false) {
            while let Some(chunk) = field.next().await {
                let data =
                    chunk.map_err(|e| UploadReadError::Invalid(format!("读取数据失败: {e}")))?;
                if file_bytes.len() + data.len() > max_size {
                    return Err(UploadReadError::TooLarge(max_size));
                }
                file_bytes.extend_from_slice(&data);
            }
        }
    }

    if file_bytes.is_empty() {
        return Err(UploadReadError::Invalid("未找到文件字段".to_string()));
    }

    Ok(file_bytes)
}

fn parse_csv(data: &[u8]) -> Result<Vec<CompletionRow>, CompletionParseError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(Cursor::new(data));

    // 检查表头
    let headers = rdr
        .headers()
        .map_err(|e| CompletionParseError::ParseFailed(format!("读取表头失败: {e}")))?;
    let header_map: HashMap<_, _> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_lowercase(), i))
        .collect();

    let email_idx = *header_map
        .get("email")
        .ok_or_else(|| CompletionParseError::MissingColumn("email".to_string()))?;
    let completed_at_idx = header_map.get("completed_at").copied();

    let mut rows = Vec::new();

    for (row_num, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| {
            CompletionParseError::ParseFailed(format!("第 {} 行解析失败: {e}", row_num + 2))
        })?;

        // 跳过空行
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }

        rows.push(CompletionRow {
            row_num: row_num + 2, // 1-based, skip header
            email: record.get(email_idx).unwrap_or("").to_string(),
            completed_at: completed_at_idx
                .and_then(|i| record.get(i))
                .unwrap_or("")
                .to_string(),
        });
    }

    Ok(rows)
}

/// 解析结业时间，空值使用 `default`
fn parse_completed_at(raw: &str, default: DateTime<Utc>) -> Result<DateTime<Utc>, String> {
    if raw.is_empty() {
        return Ok(default);
    }

    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
        .ok_or_else(|| format!("无效的日期: {raw}，应为 RFC 3339 或 YYYY-MM-DD"))
}
