use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use super::SystemService;
use crate::models::{AppStartTime, ApiResponse, system::responses::HealthResponse};

pub async fn health(service: &SystemService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let now = chrono::Utc::now();
    let started_at = request
        .app_data::<web::Data<AppStartTime>>()
        .map(|t| t.start_datetime)
        .unwrap_or(now);

    let response = HealthResponse {
        status: "ok".to_string(),
        system_name: service.get_config().app.system_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        started_at,
        uptime_secs: now.signed_duration_since(started_at).num_seconds(),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Service is healthy")))
}
