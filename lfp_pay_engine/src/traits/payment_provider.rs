use thiserror::Error;

use crate::lfp_api::payment_objects::PaymentInformation;

#[derive(Debug, Clone, Error)]
pub enum PaymentProviderError {
    #[error("Payment {0} was not found")]
    PaymentNotFound(String),
    #[error("Could not reach the payment provider: {0}")]
    Transport(String),
    #[error("The payment provider returned an unexpected response: {0}")]
    InvalidResponse(String),
}

#[allow(async_fn_in_trait)]
pub trait PaymentProvider {
    /// Fetches the payment session and its card details from the payment provider.
    async fn get_payment_information(&self, payment_id: &str) -> Result<PaymentInformation, PaymentProviderError>;
}
