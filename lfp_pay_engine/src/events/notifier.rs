use log::*;

use crate::{
    db_types::PayableResource,
    events::{EventProducers, PaymentConfirmedEmail},
    lfp_api::payment_objects::PaymentInformation,
    traits::{NotificationError, NotificationSender},
};

/// Sends payment confirmations by publishing a [`PaymentConfirmedEmail`] event to the registered hooks.
///
/// Publishing only queues the message. Implementations that must report delivery failures build the message with
/// [`EventNotifier::confirmation_email`], deliver it themselves and then call [`EventNotifier::publish`].
#[derive(Clone, Default)]
pub struct EventNotifier {
    producers: EventProducers,
    chs_url: String,
}

impl EventNotifier {
    pub fn new(producers: EventProducers, chs_url: &str) -> Self {
        Self { producers, chs_url: chs_url.to_string() }
    }

    pub fn confirmation_email(
        &self,
        resource: &PayableResource,
        payment: &PaymentInformation,
    ) -> Result<PaymentConfirmedEmail, NotificationError> {
        PaymentConfirmedEmail::new(resource, payment, &self.chs_url).ok_or_else(|| {
            NotificationError::MessageError(format!("Payable resource {} has no transactions", resource.reference))
        })
    }

    /// Hands the message to every hook. Returns the number of hooks that received it.
    pub async fn publish(&self, email: PaymentConfirmedEmail) -> Result<usize, NotificationError> {
        let message_id = email.message_id.clone();
        let count = self
            .producers
            .publish_payment_confirmed(email)
            .await
            .map_err(|e| NotificationError::SendError(e.to_string()))?;
        if count == 0 {
            debug!("📬️ No hooks are listening for payment confirmations ({message_id})");
        }
        Ok(count)
    }
}

impl NotificationSender for EventNotifier {
    async fn send_payment_confirmation(
        &self,
        resource: &PayableResource,
        payment: &PaymentInformation,
    ) -> Result<(), NotificationError> {
        let email = self.confirmation_email(resource, payment)?;
        let message_id = email.message_id.clone();
        if self.publish(email).await? == 0 {
            warn!("📬️ No e-mail will be sent for {message_id}");
        } else {
            info!("📬️ Payment confirmation {message_id} queued for {}", resource.created_by.email);
        }
        Ok(())
    }
}
