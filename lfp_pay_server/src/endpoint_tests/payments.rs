use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::Utc;
use e5_client::{E5ApiError, PaymentAction};
use lfp_common::Pence;
use lfp_pay_engine::{
    db_types::{PayableResource, PaymentStatus},
    lfp_api::payment_objects::PaymentInformation,
    traits::{PaymentProviderError, PaymentUpdateResult, SettlementClaim},
    PayableResourceApi,
    SettlementApi,
};
use serde_json::json;

use super::{
    helpers::{as_internal_app, as_user, paid_resource, pending_resource, send_request, COMPANY, CREATOR, REFERENCE},
    mocks::{MockLedger, MockNotifier, MockProvider, MockStore},
};
use crate::routes::{MarkAsPaidRoute, UnlockLedgerAccountRoute};

const PAYMENT_URL: &str = "/company/10000024/penalties/late-filing/payable/AB12345678/payment";

struct Backends {
    resources: MockStore,
    settlement: MockStore,
    ledger: MockLedger,
    notifier: MockNotifier,
    provider: MockProvider,
}

impl Backends {
    /// Every backend starts out refusing all calls, apart from reads of `resource`.
    fn new(resource: Option<PayableResource>) -> Self {
        Self {
            resources: store_with(resource.clone()),
            settlement: store_with(resource),
            ledger: MockLedger::new(),
            notifier: MockNotifier::new(),
            provider: MockProvider::new(),
        }
    }

    fn configure(self) -> impl FnOnce(&mut ServiceConfig) {
        move |cfg| {
            let Backends { resources, settlement, ledger, notifier, provider } = self;
            let settlement = SettlementApi::new(settlement, ledger, notifier, "LP");
            cfg.app_data(web::Data::new(PayableResourceApi::new(resources)))
                .app_data(web::Data::new(settlement))
                .app_data(web::Data::new(provider))
                .service(MarkAsPaidRoute::<MockStore, MockLedger, MockNotifier, MockProvider>::new())
                .service(UnlockLedgerAccountRoute::<MockStore, MockLedger, MockNotifier>::new());
        }
    }
}

fn store_with(resource: Option<PayableResource>) -> MockStore {
    let mut store = MockStore::new();
    store
        .expect_fetch_payable_resource()
        .withf(|company, reference| company == COMPANY && reference == REFERENCE)
        .returning(move |_, _| Ok(resource.clone()));
    store
}

/// The settlement store hands out the claim for the E5 session.
fn claimable(store: &mut MockStore) {
    store.expect_claim_for_settlement().times(1).returning(|_, _, id| {
        assert_eq!(id, "XP1234");
        let mut resource = pending_resource();
        resource.e5_payment_id = Some(id.to_string());
        Ok(SettlementClaim::Claimed(resource))
    });
}

fn payment(status: PaymentStatus, pounds: i64) -> PaymentInformation {
    PaymentInformation {
        payment_id: "P1234".into(),
        reference: "late_filing_penalty_AB12345678".into(),
        status,
        amount: Pence::from_pounds(pounds),
        completed_at: Some(Utc::now()),
        created_by: "director@example.com".into(),
        card_type: "Visa".into(),
        external_payment_id: "ext-1".into(),
    }
}

fn provider_returning(info: PaymentInformation) -> MockProvider {
    let mut provider = MockProvider::new();
    provider
        .expect_get_payment_information()
        .withf(|id| id == "P1234")
        .times(1)
        .returning(move |_| Ok(info.clone()));
    provider
}

fn patch() -> TestRequest {
    TestRequest::patch().uri(PAYMENT_URL).set_json(json!({ "reference": "P1234" }))
}

#[actix_web::test]
async fn settle_payment() {
    let mut backends = Backends::new(Some(pending_resource()));
    backends.provider = provider_returning(payment(PaymentStatus::Paid, 150));
    claimable(&mut backends.settlement);
    backends.settlement.expect_update_payment_details().times(1).returning(|_, _, payment| {
        assert_eq!(payment.status, PaymentStatus::Paid);
        assert_eq!(payment.reference.as_deref(), Some("late_filing_penalty_AB12345678"));
        Ok(PaymentUpdateResult::Updated(paid_resource()))
    });
    backends.ledger.expect_create_payment().times(1).returning(|input| {
        assert_eq!(input.payment_id, "XP1234");
        assert_eq!(input.total_value, Pence::from_pounds(150));
        Ok(())
    });
    backends.ledger.expect_authorise_payment().times(1).returning(|input| {
        assert_eq!(input.card_reference, "ext-1");
        assert_eq!(input.email, "director@example.com");
        Ok(())
    });
    backends.ledger.expect_confirm_payment().times(1).returning(|_| Ok(()));
    backends.notifier.expect_send_payment_confirmation().times(1).returning(|_, _| Ok(()));
    let (status, body) = send_request(as_internal_app(patch()), backends.configure()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
}

#[actix_web::test]
async fn only_internal_apps_can_settle_payments() {
    let mut backends = Backends::new(Some(pending_resource()));
    backends.provider.expect_get_payment_information().never();
    let (status, _) = send_request(as_user(patch(), CREATOR), backends.configure()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn payment_reference_is_required() {
    let mut backends = Backends::new(Some(pending_resource()));
    backends.provider.expect_get_payment_information().never();
    let req = TestRequest::patch().uri(PAYMENT_URL).set_json(json!({ "reference": " " }));
    let (status, body) = send_request(as_internal_app(req), backends.configure()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("A payment reference is required"));
}

#[actix_web::test]
async fn unknown_payment_is_rejected() {
    let mut backends = Backends::new(Some(pending_resource()));
    backends
        .provider
        .expect_get_payment_information()
        .times(1)
        .returning(|id| Err(PaymentProviderError::PaymentNotFound(id.to_string())));
    backends.settlement.expect_update_payment_details().never();
    let (status, _) = send_request(as_internal_app(patch()), backends.configure()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn short_payment_is_rejected_without_touching_e5() {
    let mut backends = Backends::new(Some(pending_resource()));
    backends.provider = provider_returning(payment(PaymentStatus::Paid, 100));
    backends.settlement.expect_update_payment_details().never();
    backends.ledger.expect_create_payment().never();
    backends.notifier.expect_send_payment_confirmation().never();
    let (status, body) = send_request(as_internal_app(patch()), backends.configure()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("There was a problem validating the payment"));
}

#[actix_web::test]
async fn failed_payment_is_rejected() {
    let mut backends = Backends::new(Some(pending_resource()));
    backends.provider = provider_returning(payment(PaymentStatus::from("failed"), 150));
    backends.settlement.expect_update_payment_details().never();
    backends.ledger.expect_create_payment().never();
    let (status, _) = send_request(as_internal_app(patch()), backends.configure()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn paid_resources_cannot_be_paid_again() {
    let mut backends = Backends::new(Some(paid_resource()));
    backends.provider = provider_returning(payment(PaymentStatus::Paid, 150));
    backends.settlement.expect_update_payment_details().never();
    backends.ledger.expect_create_payment().never();
    backends.notifier.expect_send_payment_confirmation().never();
    let (status, body) = send_request(as_internal_app(patch()), backends.configure()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("already been paid"));
}

#[actix_web::test]
async fn e5_failure_is_recorded_and_reported() {
    let mut backends = Backends::new(Some(pending_resource()));
    backends.provider = provider_returning(payment(PaymentStatus::Paid, 150));
    claimable(&mut backends.settlement);
    backends
        .settlement
        .expect_update_payment_details()
        .times(1)
        .returning(|_, _, _| Ok(PaymentUpdateResult::Updated(paid_resource())));
    backends.ledger.expect_create_payment().times(1).returning(|_| Ok(()));
    backends
        .ledger
        .expect_authorise_payment()
        .times(1)
        .returning(|_| Err(E5ApiError::InternalServer));
    backends.ledger.expect_confirm_payment().never();
    backends
        .settlement
        .expect_save_e5_error()
        .withf(|_, _, action| *action == PaymentAction::Authorise)
        .times(1)
        .returning(|_, _, _| Ok(()));
    backends.notifier.expect_send_payment_confirmation().times(1).returning(|_, _| Ok(()));
    let (status, _) = send_request(as_internal_app(patch()), backends.configure()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn payment_already_being_settled_is_rejected() {
    let mut backends = Backends::new(Some(pending_resource()));
    backends.provider = provider_returning(payment(PaymentStatus::Paid, 150));
    backends
        .settlement
        .expect_claim_for_settlement()
        .times(1)
        .returning(|_, _, _| Ok(SettlementClaim::AlreadyClaimed("XP0001".into())));
    backends.settlement.expect_update_payment_details().never();
    backends.ledger.expect_create_payment().never();
    backends.notifier.expect_send_payment_confirmation().never();
    let (status, body) = send_request(as_internal_app(patch()), backends.configure()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("already being settled"));
}

#[actix_web::test]
async fn missing_resource_cannot_be_paid() {
    let mut backends = Backends::new(None);
    backends.provider.expect_get_payment_information().never();
    let (status, _) = send_request(as_internal_app(patch()), backends.configure()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn timeout_unlocks_ledger_account() {
    let mut backends = Backends::new(Some(paid_resource()));
    backends.ledger.expect_timeout_payment().times(1).returning(|input| {
        assert_eq!(input.company_code, "LP");
        assert_eq!(input.payment_id, "XP1234");
        Ok(())
    });
    let req = TestRequest::post().uri("/company/10000024/penalties/late-filing/payable/AB12345678/e5/timeout");
    let (status, _) = send_request(as_internal_app(req), backends.configure()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn timeout_releases_an_unpaid_claim() {
    let mut claimed = pending_resource();
    claimed.e5_payment_id = Some("XP1234".into());
    let mut backends = Backends::new(Some(claimed));
    backends.ledger.expect_timeout_payment().times(1).returning(|input| {
        assert_eq!(input.payment_id, "XP1234");
        Ok(())
    });
    backends.settlement.expect_release_settlement_claim().times(1).returning(|_, _| Ok(true));
    let req = TestRequest::post().uri("/company/10000024/penalties/late-filing/payable/AB12345678/e5/timeout");
    let (status, _) = send_request(as_internal_app(req), backends.configure()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn reject_needs_a_payment_session() {
    let mut backends = Backends::new(Some(pending_resource()));
    backends.ledger.expect_reject_payment().never();
    let req = TestRequest::post().uri("/company/10000024/penalties/late-filing/payable/AB12345678/e5/reject");
    let (status, _) = send_request(as_internal_app(req), backends.configure()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn only_timeout_and_reject_unlock_accounts() {
    let backends = Backends::new(Some(paid_resource()));
    let req = TestRequest::post().uri("/company/10000024/penalties/late-filing/payable/AB12345678/e5/confirm");
    let (status, _) = send_request(as_internal_app(req), backends.configure()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let backends = Backends::new(Some(paid_resource()));
    let req = TestRequest::post().uri("/company/10000024/penalties/late-filing/payable/AB12345678/e5/unlock");
    let (status, _) = send_request(as_internal_app(req), backends.configure()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn users_cannot_unlock_ledger_accounts() {
    let mut backends = Backends::new(Some(paid_resource()));
    backends.ledger.expect_timeout_payment().never();
    let req = TestRequest::post().uri("/company/10000024/penalties/late-filing/payable/AB12345678/e5/timeout");
    let (status, _) = send_request(as_user(req, CREATOR), backends.configure()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
