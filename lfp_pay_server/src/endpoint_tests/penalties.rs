use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use e5_client::E5ApiError;
use lfp_pay_engine::{lfp_api::penalty_types::PenaltyTypes, PenaltiesApi};

use super::{
    helpers::{as_internal_app, as_user, ledger_response, penalty_transaction, send_request, CREATOR},
    mocks::MockLedger,
};
use crate::routes::PenaltiesRoute;

fn configure(ledger: MockLedger) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = PenaltiesApi::new(ledger, PenaltyTypes::default(), "LP");
        cfg.app_data(web::Data::new(api)).service(PenaltiesRoute::<MockLedger>::new());
    }
}

#[actix_web::test]
async fn penalties_need_an_identity() {
    let mut ledger = MockLedger::new();
    ledger.expect_get_transactions().never();
    let req = TestRequest::get().uri("/company/10000024/penalties/late-filing");
    let (status, body) = send_request(req, configure(ledger)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("ERIC-Identity"));
}

#[actix_web::test]
async fn list_penalties() {
    let mut ledger = MockLedger::new();
    ledger.expect_get_transactions().times(1).returning(|input| {
        assert_eq!(input.company_code, "LP");
        assert_eq!(input.company_number, "SC123456");
        let mut other = penalty_transaction("00378421", 20);
        other.transaction_type = "5".into();
        Ok(ledger_response(vec![penalty_transaction("00378420", 150), other]))
    });
    let req = as_user(TestRequest::get().uri("/company/sc123456/penalties/late-filing"), CREATOR);
    let (status, body) = send_request(req, configure(ledger)).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["total_results"], 2);
    assert_eq!(json["items"][0]["id"], "00378420");
    assert_eq!(json["items"][0]["kind"], "late-filing-penalty#late-filing-penalty");
    assert_eq!(json["items"][0]["original_amount"], 150.0);
    assert_eq!(json["items"][1]["id"], "00378421");
}

#[actix_web::test]
async fn internal_apps_can_list_penalties() {
    let mut ledger = MockLedger::new();
    ledger.expect_get_transactions().times(1).returning(|_| Ok(ledger_response(vec![])));
    let req = as_internal_app(TestRequest::get().uri("/company/10000024/penalties/late-filing"));
    let (status, body) = send_request(req, configure(ledger)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""total_results":0"#));
}

#[actix_web::test]
async fn ledger_failures_are_hidden() {
    let mut ledger = MockLedger::new();
    ledger
        .expect_get_transactions()
        .times(1)
        .returning(|_| Err(E5ApiError::Transport("connection refused".into())));
    let req = as_user(TestRequest::get().uri("/company/10000024/penalties/late-filing"), CREATOR);
    let (status, body) = send_request(req, configure(ledger)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, r#"{"error":"there was a problem communicating with the finance backend"}"#);
    assert!(!body.contains("connection refused"));
}
