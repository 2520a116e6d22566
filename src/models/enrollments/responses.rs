use serde::Serialize;
use ts_rs::TS;

// 批量审批中单条失败信息
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct BulkApprovalFailure {
    pub enrollment_id: i64,
    pub code: i32,
    pub message: String,
}

// 批量审批结果
#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct BulkApprovalResponse {
    pub approved: Vec<i64>,
    pub failed: Vec<BulkApprovalFailure>,
}

// 结业名单行错误
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct CompletionRowError {
    pub row: usize,
    pub field: String,
    pub message: String,
}

// 结业名单上传结果
#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct CompletionUploadResponse {
    pub total: usize,
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub errors: Vec<CompletionRowError>,
}

impl CompletionUploadResponse {
    /// 记录一行失败
    pub fn record_failure(&mut self, row: usize, field: &str, message: impl Into<String>) {
        self.failed += 1;
        self.errors.push(CompletionRowError {
            row,
            field: field.to_string(),
            message: message.into(),
        });
    }
}
