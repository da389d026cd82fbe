use actix_web::{http::StatusCode, test::TestRequest, web};
use chrono::{Duration, Utc};

use super::helpers::send_request;
use crate::{
    maintenance::MaintenanceConfig,
    routes::{finance_health, health},
};

fn configure_finance_health(maintenance: MaintenanceConfig) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(maintenance)).service(finance_health);
    }
}

#[actix_web::test]
async fn health_endpoint() {
    let (status, body) = send_request(TestRequest::get().uri("/healthcheck"), |cfg| {
        cfg.service(health);
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[actix_web::test]
async fn finance_system_is_healthy_without_maintenance() {
    let req = TestRequest::get().uri("/healthcheck/finance-system");
    let (status, body) = send_request(req, configure_finance_health(MaintenanceConfig::default())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"message":"HEALTHY"}"#);
}

#[actix_web::test]
async fn finance_system_in_planned_maintenance() {
    let end = Utc::now() + Duration::hours(1);
    let maintenance = MaintenanceConfig {
        planned_start: Some(Ok(Utc::now() - Duration::hours(1))),
        planned_end: Some(Ok(end)),
        ..Default::default()
    };
    let req = TestRequest::get().uri("/healthcheck/finance-system");
    let (status, body) = send_request(req, configure_finance_health(maintenance)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["message"], "UNHEALTHY - PLANNED MAINTENANCE");
    let until: chrono::DateTime<Utc> = serde_json::from_value(json["maintenance_end_time"].clone()).unwrap();
    assert_eq!(until, end);
}

#[actix_web::test]
async fn finance_system_maintenance_in_the_past() {
    let maintenance = MaintenanceConfig {
        planned_start: Some(Ok(Utc::now() - Duration::hours(3))),
        planned_end: Some(Ok(Utc::now() - Duration::hours(2))),
        ..Default::default()
    };
    let req = TestRequest::get().uri("/healthcheck/finance-system");
    let (status, _) = send_request(req, configure_finance_health(maintenance)).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn finance_system_with_bad_maintenance_times() {
    let maintenance = MaintenanceConfig {
        planned_start: Some(Err("not-a-date".into())),
        planned_end: Some(Ok(Utc::now() + Duration::hours(1))),
        ..Default::default()
    };
    let req = TestRequest::get().uri("/healthcheck/finance-system");
    let (status, body) = send_request(req, configure_finance_health(maintenance)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("failed to get maintenance times from config"));
}
