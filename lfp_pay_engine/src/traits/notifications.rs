use thiserror::Error;

use crate::{db_types::PayableResource, lfp_api::payment_objects::PaymentInformation};

#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    #[error("Could not build the confirmation message: {0}")]
    MessageError(String),
    #[error("Could not send the confirmation message: {0}")]
    SendError(String),
}

#[allow(async_fn_in_trait)]
pub trait NotificationSender {
    /// Tells the payer that their penalty payment has been received.
    async fn send_payment_confirmation(
        &self,
        resource: &PayableResource,
        payment: &PaymentInformation,
    ) -> Result<(), NotificationError>;
}
