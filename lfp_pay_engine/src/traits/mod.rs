//! # Backend and collaborator contracts
//!
//! The payment engine talks to three things it does not own:
//!
//! * [`PayableResourceManagement`] is the storage backend for payable resources. [`crate::SqliteDatabase`] is the
//!   shipped implementation.
//! * [`FinanceLedger`] is the E5 finance system. [`e5_client::E5Client`] implements it.
//! * [`PaymentProvider`] answers "has this payment been made?". The server crate provides an HTTP implementation.
//!
//! [`NotificationSender`] sends the confirmation e-mail once a payment has been taken.
mod finance_ledger;
mod notifications;
mod payable_resource_management;
mod payment_provider;

pub use finance_ledger::FinanceLedger;
pub use notifications::{NotificationError, NotificationSender};
pub use payable_resource_management::{
    PayableResourceManagement,
    PayableStoreError,
    PaymentUpdateResult,
    SettlementClaim,
};
pub use payment_provider::{PaymentProvider, PaymentProviderError};
