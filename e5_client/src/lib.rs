//! Client for the E5 finance ledger.
//!
//! E5 is the source of truth for the accounts-receivable transactions of a company. The client exposes the two halves
//! of its API that the penalty payment service needs:
//! * the transaction query (`GET /arTransactions/{company_number}`), and
//! * the payment lifecycle (`create`, `authorise`, then one of `confirm`, `timeout` or `reject`).
//!
//! The payment lifecycle is not transactional. A `create` locks the customer account in the ledger and only a
//! `confirm`, `timeout` or `reject` releases it again.
mod api;
mod config;
mod error;

mod data_objects;

pub use api::E5Client;
pub use config::E5Config;
pub use data_objects::{
    ApiErrorResponse,
    AuthorisePaymentInput,
    CreatePaymentInput,
    CreatePaymentTransaction,
    GetTransactionsInput,
    GetTransactionsResponse,
    Page,
    PaymentAction,
    PaymentActionInput,
    SubError,
    Transaction,
};
pub use error::E5ApiError;
