pub mod health;
pub mod scheduler;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::config::AppConfig;

pub struct SystemService;

impl SystemService {
    pub fn new_lazy() -> Self {
        Self
    }

    pub(crate) fn get_config(&self) -> &AppConfig {
        AppConfig::get()
    }

    // 健康检查
    pub async fn health(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        health::health(self, request).await
    }

    // 后台任务状态
    pub async fn scheduler_status(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        scheduler::scheduler_status(self, request).await
    }
}
