//! 启动自检：加载配置、连接存储、注册路由并请求一次健康检查
//!
//! 任何错误或 panic 都只打印出来，进程总是正常退出。

use std::error::Error;
use std::panic::AssertUnwindSafe;

use actix_web::{App, test, web};
use dotenv::dotenv;
use futures_util::FutureExt;

use rust_onsite_training::config::AppConfig;
use rust_onsite_training::models::AppStartTime;
use rust_onsite_training::routes;
use rust_onsite_training::runtime::lifetime::startup::prepare_server_startup;
use rust_onsite_training::utils::{json_error_handler, query_error_handler};

type BoxError = Box<dyn Error + Send + Sync>;

async fn check() -> Result<(), BoxError> {
    AppConfig::init()?;
    let startup = prepare_server_startup().await?;

    let app = test::init_service(
        App::new()
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::Data::new(startup.storage.clone()))
            .app_data(web::Data::new(startup.scheduler.clone()))
            .app_data(web::Data::new(AppStartTime {
                start_datetime: chrono::Utc::now(),
            }))
            .configure(routes::configure_api_routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/system/health")
        .to_request();
    let resp = test::call_service(&app, req).await;
    if !resp.status().is_success() {
        return Err(format!("health check returned {}", resp.status()).into());
    }

    println!(
        "Application loaded: {} route(s) registered, {} background job(s)",
        routes::API_ROUTES.len(),
        startup.scheduler.job_statuses().len()
    );
    Ok(())
}

fn print_error_chain(err: &(dyn Error + 'static)) {
    println!("Application failed to load: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        println!("  caused by: {cause}");
        source = cause.source();
    }
}

#[actix_web::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("warn"))
        .init();

    match AssertUnwindSafe(check()).catch_unwind().await {
        Ok(Ok(())) => println!("OK"),
        Ok(Err(e)) => print_error_chain(e.as_ref()),
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            println!("Application panicked while loading: {message}");
        }
    }
}
