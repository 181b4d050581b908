//! 接口集成测试：指标端点与路由注册
//! API integration tests: metrics endpoints and route registration

use actix_web::{test, web, App};
use std::sync::Arc;

use recetas_blog::api;
use recetas_blog::middleware::metrics::PerformanceMonitor;

#[actix_web::test]
async fn test_health_endpoint_reports_healthy() {
    let monitor = Arc::new(PerformanceMonitor::new());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(monitor.clone()))
            .configure(api::metrics::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_metrics_endpoint_counts_through_middleware() {
    let monitor = Arc::new(PerformanceMonitor::new());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(monitor.clone()))
            .wrap(recetas_blog::middleware::metrics::MetricsMiddleware::new(
                monitor.clone(),
            ))
            .configure(api::metrics::configure),
    )
    .await;

    // 先打一次健康检查，再读指标
    let req = test::TestRequest::get().uri("/api/health").to_request();
    let _ = test::call_service(&app, req).await;

    let req = test::TestRequest::get().uri("/api/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 0);
    assert!(body["data"]["total_requests"].as_u64().unwrap() >= 1);
}

#[actix_web::test]
async fn test_reset_endpoint_clears_counters() {
    let monitor = Arc::new(PerformanceMonitor::new());
    let record = monitor.record_request_start("/recetas", "GET");
    monitor.record_request_end(record, 200);

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(monitor.clone()))
            .configure(api::metrics::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/metrics/reset")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert_eq!(monitor.get_metrics().total_requests, 0);
}

#[::core::prelude::v1::test]
fn test_los_modulos_registran_sus_rutas() {
    recetas_blog::init_routes();

    let (total, mut modules) = recetas_blog::get_global_routes_stats();
    modules.sort();
    assert_eq!(total, 2);
    assert_eq!(modules, vec!["recetas".to_string(), "usuarios".to_string()]);
}
