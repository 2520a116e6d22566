pub mod approval;
pub mod bulk_approve;
pub mod cancel;
pub mod completions;
pub mod create;
pub mod delete;
pub mod get;
pub mod list;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::enrollments::requests::{
    BulkEnrollmentApproval, EnrollmentApproval, EnrollmentCancel, EnrollmentCreate,
    EnrollmentListQuery,
};
use crate::storage::Storage;

pub struct EnrollmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl EnrollmentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    // 获取报名列表
    pub async fn list_enrollments(
        &self,
        request: &HttpRequest,
        query: EnrollmentListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_enrollments(self, request, query).await
    }

    // 创建报名（待审批）
    pub async fn create_enrollment(
        &self,
        request: &HttpRequest,
        enrollment: EnrollmentCreate,
    ) -> ActixResult<HttpResponse> {
        create::create_enrollment(self, request, enrollment).await
    }

    pub async fn get_enrollment(
        &self,
        request: &HttpRequest,
        enrollment_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_enrollment(self, request, enrollment_id).await
    }

    pub async fn delete_enrollment(
        &self,
        request: &HttpRequest,
        enrollment_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_enrollment(self, request, enrollment_id).await
    }

    // 取消报名
    pub async fn cancel_enrollment(
        &self,
        request: &HttpRequest,
        enrollment_id: i64,
        cancel: EnrollmentCancel,
    ) -> ActixResult<HttpResponse> {
        cancel::cancel_enrollment(self, request, enrollment_id, cancel).await
    }

    // 审批单条报名
    pub async fn review_enrollment(
        &self,
        request: &HttpRequest,
        enrollment_id: i64,
        approval: EnrollmentApproval,
    ) -> ActixResult<HttpResponse> {
        approval::review_enrollment(self, request, enrollment_id, approval).await
    }

    // 批量审批通过
    pub async fn bulk_approve(
        &self,
        request: &HttpRequest,
        bulk: BulkEnrollmentApproval,
    ) -> ActixResult<HttpResponse> {
        bulk_approve::bulk_approve(self, request, bulk).await
    }

    // 上传结业名单
    pub async fn upload_completions(
        &self,
        request: &HttpRequest,
        course_id: i64,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        completions::upload_completions(self, request, course_id, payload).await
    }
}
