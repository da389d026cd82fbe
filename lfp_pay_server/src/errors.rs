use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use lfp_pay_engine::{
    traits::PaymentProviderError,
    PayabilityError,
    PayableResourceError,
    PenaltiesApiError,
    SettlementError,
};
use log::*;
use thiserror::Error;

const FINANCE_BACKEND_ERROR: &str = "there was a problem communicating with the finance backend";
const NOT_PAYABLE_MESSAGE: &str = "the transactions you want to pay for do not exist or are not payable at this time";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("{FINANCE_BACKEND_ERROR}")]
    FinanceBackendError,
    #[error("{NOT_PAYABLE_MESSAGE}")]
    NotPayable,
    #[error("The payment could not be accepted. {0}")]
    PaymentNotAccepted(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::NotPayable => StatusCode::BAD_REQUEST,
            Self::PaymentNotAccepted(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingIdentity(_) => StatusCode::UNAUTHORIZED,
                AuthError::UnsupportedIdentityType(_) => StatusCode::UNAUTHORIZED,
                AuthError::PoorlyFormattedUser(_) => StatusCode::UNAUTHORIZED,
                AuthError::InsufficientPermissions(_) => StatusCode::UNAUTHORIZED,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::FinanceBackendError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Identity header {0} is missing")]
    MissingIdentity(&'static str),
    #[error("Identity type {0} is not supported")]
    UnsupportedIdentityType(String),
    #[error("The authorised user header is not in the correct format. {0}")]
    PoorlyFormattedUser(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
}

impl From<PenaltiesApiError> for ServerError {
    fn from(e: PenaltiesApiError) -> Self {
        match e {
            PenaltiesApiError::LedgerError(e) => {
                error!("💻️ Could not fetch penalties from E5. {e}");
                Self::FinanceBackendError
            },
            PenaltiesApiError::PenaltyNotFound { .. } => Self::NoRecordFound(e.to_string()),
        }
    }
}

impl From<PayabilityError> for ServerError {
    fn from(e: PayabilityError) -> Self {
        match e {
            PayabilityError::Ledger(e) => e.into(),
            e => {
                info!("💻️ Rejecting payable resource request. {e}");
                Self::NotPayable
            },
        }
    }
}

impl From<PayableResourceError> for ServerError {
    fn from(e: PayableResourceError) -> Self {
        match e {
            PayableResourceError::Storage(e) => Self::BackendError(format!("Database error: {e}")),
            PayableResourceError::ResourceNotFound => Self::NoRecordFound(e.to_string()),
            PayableResourceError::AlreadyPaid => Self::PaymentNotAccepted(e.to_string()),
            PayableResourceError::NoPaymentItems(_) => Self::NoRecordFound(e.to_string()),
            PayableResourceError::SettlementInProgress(_) => Self::PaymentNotAccepted(e.to_string()),
        }
    }
}

impl From<PaymentProviderError> for ServerError {
    fn from(e: PaymentProviderError) -> Self {
        match e {
            PaymentProviderError::PaymentNotFound(_) | PaymentProviderError::InvalidResponse(_) => {
                Self::PaymentNotAccepted(e.to_string())
            },
            PaymentProviderError::Transport(_) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<SettlementError> for ServerError {
    fn from(e: SettlementError) -> Self {
        match e {
            SettlementError::ResourceNotFound => Self::NoRecordFound(e.to_string()),
            SettlementError::AlreadyPaid
            | SettlementError::PaymentNotValid(_)
            | SettlementError::SettlementInProgress(_)
            | SettlementError::NoLedgerSession(_)
            | SettlementError::InvalidUnlockAction(_) => Self::PaymentNotAccepted(e.to_string()),
            e => Self::BackendError(e.to_string()),
        }
    }
}
