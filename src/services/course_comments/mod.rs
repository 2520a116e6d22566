pub mod create;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::course_comments::requests::CourseCommentCreate;
use crate::storage::Storage;

pub struct CourseCommentService {
    storage: Option<Arc<dyn Storage>>,
}

impl CourseCommentService {
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

    // 发表课程评论
    pub async fn create_comment(
        &self,
        request: &HttpRequest,
        course_id: i64,
        comment: CourseCommentCreate,
    ) -> ActixResult<HttpResponse> {
        create::create_comment(self, request, course_id, comment).await
    }

    // 课程评论列表
    pub async fn list_comments(
        &self,
        request: &HttpRequest,
        course_id: i64,
    ) -> ActixResult<HttpResponse> {
        list::list_comments(self, request, course_id).await
    }
}
