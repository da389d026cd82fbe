use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use lfp_common::Pence;
use lfp_pay_engine::{lfp_api::penalty_types::PenaltyTypes, PayableResourceApi, PenaltiesApi};
use serde_json::json;

use super::{
    helpers::{
        as_internal_app,
        as_user,
        as_user_with_role,
        ledger_response,
        paid_resource,
        pending_resource,
        penalty_transaction,
        send_request,
        stored,
        COMPANY,
        CREATOR,
        PENALTY_ID,
        REFERENCE,
    },
    mocks::{MockLedger, MockStore},
};
use crate::{
    auth::PENALTY_LOOKUP_ROLE,
    routes::{CreatePayableRoute, GetPayableRoute, PaymentDetailsRoute},
};

const PAYABLE_URL: &str = "/company/10000024/penalties/late-filing/payable";

fn configure_create(ledger: MockLedger, store: MockStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let penalties = PenaltiesApi::new(ledger, PenaltyTypes::default(), "LP");
        cfg.app_data(web::Data::new(penalties))
            .app_data(web::Data::new(PayableResourceApi::new(store)))
            .service(CreatePayableRoute::<MockLedger, MockStore>::new());
    }
}

fn configure_get(store: MockStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(PayableResourceApi::new(store)))
            .service(GetPayableRoute::<MockStore>::new())
            .service(PaymentDetailsRoute::<MockStore>::new());
    }
}

fn store_with(resource: Option<lfp_pay_engine::db_types::PayableResource>) -> MockStore {
    let mut store = MockStore::new();
    store
        .expect_fetch_payable_resource()
        .withf(|company, reference| company == COMPANY && reference == REFERENCE)
        .returning(move |_, _| Ok(resource.clone()));
    store
}

fn ledger_with_penalty() -> MockLedger {
    let mut ledger = MockLedger::new();
    ledger.expect_get_transactions().returning(|_| Ok(ledger_response(vec![penalty_transaction(PENALTY_ID, 150)])));
    ledger
}

fn create_body(amount: f64) -> serde_json::Value {
    json!({ "transactions": [{ "transaction_id": PENALTY_ID, "amount": amount }] })
}

#[actix_web::test]
async fn create_payable_resource() {
    let mut store = MockStore::new();
    store.expect_insert_payable_resource().times(1).returning(|new| {
        assert_eq!(new.company_number, COMPANY);
        assert_eq!(new.created_by.id, CREATOR);
        assert_eq!(new.created_by.email, "director@example.com");
        assert_eq!(new.transactions.len(), 1);
        assert_eq!(new.transactions[0].made_up_date, "2017-02-28");
        assert_eq!(new.transactions[0].amount, Pence::from_pounds(150));
        Ok(stored(new))
    });
    let req = as_user(TestRequest::post().uri(PAYABLE_URL), CREATOR).set_json(create_body(150.0));
    let (status, body) = send_request(req, configure_create(ledger_with_penalty(), store)).await;
    assert_eq!(status, StatusCode::CREATED);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    let id = json["id"].as_str().unwrap();
    assert_eq!(id.len(), 10);
    assert_eq!(json["links"]["self"], format!("{PAYABLE_URL}/{id}"));
}

#[actix_web::test]
async fn api_keys_cannot_create_payable_resources() {
    let mut store = MockStore::new();
    store.expect_insert_payable_resource().never();
    let req = as_internal_app(TestRequest::post().uri(PAYABLE_URL)).set_json(create_body(150.0));
    let (status, _) = send_request(req, configure_create(MockLedger::new(), store)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn create_needs_transactions() {
    let mut store = MockStore::new();
    store.expect_insert_payable_resource().never();
    let req = as_user(TestRequest::post().uri(PAYABLE_URL), CREATOR).set_json(json!({ "transactions": [] }));
    let (status, body) = send_request(req, configure_create(MockLedger::new(), store)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("No transactions were provided"));
}

#[actix_web::test]
async fn part_payments_are_not_payable() {
    let mut store = MockStore::new();
    store.expect_insert_payable_resource().never();
    let req = as_user(TestRequest::post().uri(PAYABLE_URL), CREATOR).set_json(create_body(100.0));
    let (status, body) = send_request(req, configure_create(ledger_with_penalty(), store)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        r#"{"error":"the transactions you want to pay for do not exist or are not payable at this time"}"#
    );
}

#[actix_web::test]
async fn fractions_of_a_penny_are_not_payable() {
    let mut store = MockStore::new();
    store.expect_insert_payable_resource().never();
    let mut ledger = MockLedger::new();
    ledger.expect_get_transactions().never();
    let req = as_user(TestRequest::post().uri(PAYABLE_URL), CREATOR).set_json(create_body(149.996));
    let (status, _) = send_request(req, configure_create(ledger, store)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn creator_can_fetch_payable_resource() {
    let req = as_user(TestRequest::get().uri(&format!("{PAYABLE_URL}/{REFERENCE}")), CREATOR);
    let (status, body) = send_request(req, configure_get(store_with(Some(pending_resource())))).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["reference"], REFERENCE);
    assert_eq!(json["company_number"], COMPANY);
    assert_eq!(json["created_by"]["id"], CREATOR);
    assert_eq!(json["transactions"][0]["transaction_id"], PENALTY_ID);
    assert_eq!(json["payment"]["status"], "pending");
    assert_eq!(json["links"]["self"], format!("{PAYABLE_URL}/{REFERENCE}"));
}

#[actix_web::test]
async fn other_users_cannot_fetch_payable_resource() {
    let req = as_user(TestRequest::get().uri(&format!("{PAYABLE_URL}/{REFERENCE}")), "someone-else");
    let (status, _) = send_request(req, configure_get(store_with(Some(pending_resource())))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn penalty_lookup_role_can_fetch_payable_resource() {
    let req = as_user_with_role(
        TestRequest::get().uri(&format!("{PAYABLE_URL}/{REFERENCE}")),
        "admin",
        PENALTY_LOOKUP_ROLE,
    );
    let (status, _) = send_request(req, configure_get(store_with(Some(pending_resource())))).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn missing_payable_resource() {
    let req = as_user(TestRequest::get().uri(&format!("{PAYABLE_URL}/{REFERENCE}")), CREATOR);
    let (status, _) = send_request(req, configure_get(store_with(None))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn payment_details_for_pending_resource() {
    let req = as_internal_app(TestRequest::get().uri(&format!("{PAYABLE_URL}/{REFERENCE}/payment")));
    let (status, body) = send_request(req, configure_get(store_with(Some(pending_resource())))).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["description"], "Late Filing Penalty");
    assert_eq!(json["kind"], "payment-details#payment-details");
    assert_eq!(json["status"], "pending");
    assert_eq!(json["items"][0]["amount"], "150.00");
    assert_eq!(json["items"][0]["class_of_payment"][0], "penalty");
    assert_eq!(json["links"]["resource"], format!("{PAYABLE_URL}/{REFERENCE}"));
}

#[actix_web::test]
async fn payment_details_for_paid_resource() {
    let req = as_user(TestRequest::get().uri(&format!("{PAYABLE_URL}/{REFERENCE}/payment")), CREATOR);
    let (status, body) = send_request(req, configure_get(store_with(Some(paid_resource())))).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "paid");
    assert_eq!(json["payment_reference"], "late_filing_penalty_AB12345678");
}
