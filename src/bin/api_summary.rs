//! 打印 API 路由一览

use rust_onsite_training::routes::API_ROUTES;

fn main() {
    println!("{} {} API", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!();

    let width = API_ROUTES.iter().map(|r| r.path.len()).max().unwrap_or(0);
    let mut current_group = "";
    for route in API_ROUTES {
        // 按 /api/v1/<group> 分组
        let group = route.path.split('/').nth(3).unwrap_or("");
        if group != current_group {
            println!("[{group}]");
            current_group = group;
        }
        println!(
            "  {:<7} {:<width$}  {}",
            route.method, route.path, route.summary
        );
    }

    println!();
    println!(
        "Responses use the envelope {{ code, message, data, timestamp }}; code 0 means success."
    );
}
