use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use super::SystemService;
use crate::models::{ApiResponse, ErrorCode, system::responses::SchedulerStatusResponse};
use crate::scheduler::SchedulerService;

pub async fn scheduler_status(
    _service: &SystemService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(scheduler) = request.app_data::<web::Data<Arc<SchedulerService>>>() else {
        return Ok(
            HttpResponse::ServiceUnavailable().json(ApiResponse::error_empty(
                ErrorCode::SchedulerUnavailable,
                "Scheduler is not configured",
            )),
        );
    };

    let response = SchedulerStatusResponse {
        running: scheduler.is_running(),
        jobs: scheduler.job_statuses(),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        "Scheduler status retrieved successfully",
    )))
}
