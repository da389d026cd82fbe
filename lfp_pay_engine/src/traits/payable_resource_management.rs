use e5_client::PaymentAction;
use thiserror::Error;

use crate::db_types::{NewPayableResource, PayableResource, Payment};

#[derive(Debug, Clone, Error)]
pub enum PayableStoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Payable resource {0} already exists")]
    AlreadyExists(String),
    #[error("Stored payable resource is corrupt: {0}")]
    CorruptRecord(String),
    #[error("Payable resource {0} does not exist")]
    NotFound(String),
}

impl From<sqlx::Error> for PayableStoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                PayableStoreError::AlreadyExists(db.message().to_string())
            },
            e => PayableStoreError::DatabaseError(e.to_string()),
        }
    }
}

/// The outcome of a conditional payment update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentUpdateResult {
    /// The resource was pending and now carries the new payment details.
    Updated(PayableResource),
    /// The resource was already paid. Nothing was written.
    AlreadyPaid,
    NotFound,
}

/// The outcome of claiming a resource for settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementClaim {
    /// This caller holds the claim and may replay the payment into E5.
    Claimed(PayableResource),
    /// Another settlement holds the claim for the given E5 payment id.
    AlreadyClaimed(String),
    AlreadyPaid,
    NotFound,
}

#[allow(async_fn_in_trait)]
pub trait PayableResourceManagement {
    /// Stores a brand-new payable resource with a `pending` payment status and a fresh etag.
    async fn insert_payable_resource(&self, resource: NewPayableResource)
        -> Result<PayableResource, PayableStoreError>;

    /// Returns `Ok(None)` if there is no such resource. Errors are reserved for storage failures.
    async fn fetch_payable_resource(
        &self,
        company_number: &str,
        reference: &str,
    ) -> Result<Option<PayableResource>, PayableStoreError>;

    /// Writes the payment details if, and only if, the stored resource is not already paid. The check and the write
    /// are a single atomic operation, so of two racing callers exactly one sees [`PaymentUpdateResult::Updated`].
    async fn update_payment_details(
        &self,
        company_number: &str,
        reference: &str,
        payment: &Payment,
    ) -> Result<PaymentUpdateResult, PayableStoreError>;

    /// Stores `e5_payment_id` against the resource if it is not paid and no other settlement has claimed it. Like
    /// [`Self::update_payment_details`], the check and the write are a single atomic operation.
    async fn claim_for_settlement(
        &self,
        company_number: &str,
        reference: &str,
        e5_payment_id: &str,
    ) -> Result<SettlementClaim, PayableStoreError>;

    /// Clears the settlement claim on a resource that is still unpaid, so that the payment can be settled again.
    /// Returns `false` if there was nothing to release.
    async fn release_settlement_claim(&self, company_number: &str, reference: &str)
        -> Result<bool, PayableStoreError>;

    /// Records the E5 call that failed. Overwrites any previously recorded failure. A missing resource is
    /// [`PayableStoreError::NotFound`].
    async fn save_e5_error(
        &self,
        company_number: &str,
        reference: &str,
        action: PaymentAction,
    ) -> Result<(), PayableStoreError>;
}
