use std::collections::BTreeMap;

use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use chrono::Utc;
use e5_client::{GetTransactionsResponse, Page, Transaction};
use lfp_common::Pence;
use lfp_pay_engine::db_types::{
    CreatedBy,
    NewPayableResource,
    PayableResource,
    Payment,
    PaymentStatus,
    TransactionItem,
    TransactionType,
};
use log::debug;

use crate::auth::{
    AUTHORISED_KEY_PRIVILEGES_HEADER,
    AUTHORISED_ROLES_HEADER,
    AUTHORISED_USER_HEADER,
    IDENTITY_HEADER,
    IDENTITY_TYPE_HEADER,
};

pub const COMPANY: &str = "10000024";
pub const REFERENCE: &str = "AB12345678";
pub const CREATOR: &str = "user1";
pub const PENALTY_ID: &str = "00378420";

/// A request from a signed-in user.
pub fn as_user(req: TestRequest, id: &str) -> TestRequest {
    req.insert_header((IDENTITY_HEADER, id))
        .insert_header((IDENTITY_TYPE_HEADER, "oauth2"))
        .insert_header((AUTHORISED_USER_HEADER, "director@example.com; forename=Jo; surname=Bloggs"))
}

pub fn as_user_with_role(req: TestRequest, id: &str, role: &str) -> TestRequest {
    as_user(req, id).insert_header((AUTHORISED_ROLES_HEADER, role))
}

/// A request from an internal API key with elevated privileges.
pub fn as_internal_app(req: TestRequest) -> TestRequest {
    req.insert_header((IDENTITY_HEADER, "payments-api-key"))
        .insert_header((IDENTITY_TYPE_HEADER, "key"))
        .insert_header((AUTHORISED_KEY_PRIVILEGES_HEADER, "internal-app"))
}

pub async fn send_request<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let _ = env_logger::try_init();
    let app = test::init_service(App::new().configure(configure)).await;
    debug!("Making request");
    let (_, res) = test::call_service(&app, req.to_request()).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

pub fn penalty_transaction(reference: &str, pounds: i64) -> Transaction {
    Transaction {
        company_code: "LP".into(),
        customer_code: COMPANY.into(),
        transaction_reference: reference.into(),
        transaction_date: "2017-11-28".into(),
        made_up_date: "2017-02-28".into(),
        amount: Pence::from_pounds(pounds),
        outstanding_amount: Pence::from_pounds(pounds),
        is_paid: false,
        transaction_type: "1".into(),
        transaction_sub_type: "EU".into(),
        due_date: "2017-12-12".into(),
        account_status: "CHS".into(),
        ..Default::default()
    }
}

pub fn ledger_response(transactions: Vec<Transaction>) -> GetTransactionsResponse {
    let total = transactions.len() as i64;
    GetTransactionsResponse { page: Page { size: total, total_elements: total, total_pages: 1, number: 0 }, transactions }
}

pub fn pending_resource() -> PayableResource {
    let mut transactions = BTreeMap::new();
    transactions.insert(PENALTY_ID.to_string(), TransactionItem {
        amount: Pence::from_pounds(150),
        made_up_date: "2017-02-28".into(),
        transaction_type: TransactionType::Penalty,
        is_paid: false,
        is_dca: false,
    });
    PayableResource {
        id: 1,
        company_number: COMPANY.into(),
        reference: REFERENCE.into(),
        etag: "d8a0b0c1e1f1".into(),
        transactions,
        payment: Payment::default(),
        created_by: CreatedBy {
            id: CREATOR.into(),
            email: "director@example.com".into(),
            forename: "Jo".into(),
            surname: "Bloggs".into(),
        },
        created_at: Utc::now(),
        updated_at: Utc::now(),
        e5_command_error: None,
        e5_payment_id: None,
    }
}

pub fn paid_resource() -> PayableResource {
    let mut resource = pending_resource();
    resource.payment = Payment {
        status: PaymentStatus::Paid,
        amount: Some(Pence::from_pounds(150)),
        reference: Some("late_filing_penalty_AB12345678".into()),
        paid_at: Some(Utc::now()),
    };
    resource.e5_payment_id = Some("XP1234".into());
    resource
}

/// What the storage backend hands back after inserting `new`.
pub fn stored(new: NewPayableResource) -> PayableResource {
    PayableResource {
        id: 2,
        company_number: new.company_number.clone(),
        reference: new.reference.clone(),
        etag: "0a1b2c3d".into(),
        transactions: new.transaction_map(),
        payment: Payment::default(),
        created_by: new.created_by,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        e5_command_error: None,
        e5_payment_id: None,
    }
}
