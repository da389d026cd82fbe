use e5_client::{E5ApiError, PaymentAction};
use lfp_common::Pence;
use thiserror::Error;

use crate::traits::{NotificationError, PayableStoreError};

#[derive(Debug, Error)]
pub enum PenaltiesApiError {
    #[error("Could not fetch transactions from E5. {0}")]
    LedgerError(#[from] E5ApiError),
    #[error("Cannot find late filing penalty {penalty} for company {company_number}")]
    PenaltyNotFound { company_number: String, penalty: String },
}

#[derive(Debug, Error)]
pub enum PenaltyTypesError {
    #[error("Could not read the penalty types file. {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid penalty types table. {0}")]
    Parse(#[from] toml::de::Error),
}

/// Reasons a claimed set of transactions cannot be paid.
#[derive(Debug, Error)]
pub enum PayabilityError {
    #[error("{0}")]
    Ledger(#[from] PenaltiesApiError),
    #[error("The company has more than one outstanding penalty")]
    MultiplePenalties,
    #[error("Transaction {0} does not exist")]
    TransactionDoesNotExist(String),
    #[error("Transaction {0} is already part paid")]
    TransactionIsPartPaid(String),
    #[error("Transaction {0} is already paid")]
    TransactionIsPaid(String),
    #[error("You cannot pay for transaction {0}. It is not a penalty")]
    TransactionNotPayable(String),
    #[error("You can only pay off the full amount of transaction {id}. Claimed {claimed}, outstanding {outstanding}")]
    TransactionAmountMismatch { id: String, claimed: Pence, outstanding: Pence },
    #[error("Transaction {0} is with a debt collecting agency")]
    TransactionDca(String),
}

#[derive(Debug, Clone, Error)]
pub enum PaymentValidationError {
    #[error("The payment has not been made. Status is {0}")]
    NotPaid(String),
    #[error("The payment amount ({paid}) does not match the amount owed ({owed})")]
    AmountMismatch { paid: Pence, owed: Pence },
}

#[derive(Debug, Clone, Error)]
pub enum PayableResourceError {
    #[error("Storage error. {0}")]
    Storage(#[from] PayableStoreError),
    #[error("The late filing penalty does not exist")]
    ResourceNotFound,
    #[error("The late filing penalty has already been paid")]
    AlreadyPaid,
    #[error("There are no items to pay for on payable resource {0}")]
    NoPaymentItems(String),
    #[error("The late filing penalty is already being settled under E5 payment {0}")]
    SettlementInProgress(String),
}

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("The late filing penalty does not exist")]
    ResourceNotFound,
    #[error("The late filing penalty has already been paid")]
    AlreadyPaid,
    #[error("There was a problem validating the payment. {0}")]
    PaymentNotValid(#[from] PaymentValidationError),
    #[error("Could not mark the payable resource as paid. {0}")]
    Persistence(PayableResourceError),
    #[error("E5 {action} call failed. {source}")]
    LedgerCommand { action: PaymentAction, source: E5ApiError },
    #[error("E5 {action} call failed, and the failure could not be recorded. {source}")]
    RecordFailure { action: PaymentAction, source: PayableResourceError },
    #[error("Could not send the confirmation email. {0}")]
    Notification(#[from] NotificationError),
    #[error("The late filing penalty is already being settled under E5 payment {0}")]
    SettlementInProgress(String),
    #[error("Payable resource {0} has never been settled, so there is no E5 payment session to act on")]
    NoLedgerSession(String),
    #[error("{0} cannot be used to unlock an E5 account")]
    InvalidUnlockAction(PaymentAction),
}

impl SettlementError {
    /// The E5 call this error is attributed to, if any.
    pub fn failed_action(&self) -> Option<PaymentAction> {
        match self {
            SettlementError::LedgerCommand { action, .. } | SettlementError::RecordFailure { action, .. } => {
                Some(*action)
            },
            _ => None,
        }
    }
}

impl From<PayableResourceError> for SettlementError {
    fn from(e: PayableResourceError) -> Self {
        match e {
            PayableResourceError::ResourceNotFound => SettlementError::ResourceNotFound,
            PayableResourceError::AlreadyPaid => SettlementError::AlreadyPaid,
            PayableResourceError::SettlementInProgress(id) => SettlementError::SettlementInProgress(id),
            e => SettlementError::Persistence(e),
        }
    }
}
