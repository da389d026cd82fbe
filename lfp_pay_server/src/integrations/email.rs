//! Payment confirmation e-mails.
//!
//! [`EmailNotifier`] POSTs each confirmation to the e-mail sender and waits for the answer, so that a failed delivery
//! is part of the settlement result. Once delivered, the message is also published to the event hooks, which log it.
use std::{future::Future, pin::Pin};

use lfp_pay_engine::{
    db_types::PayableResource,
    events::{EventHandlers, EventHooks, EventNotifier, PaymentConfirmedEmail},
    lfp_api::payment_objects::PaymentInformation,
    traits::{NotificationError, NotificationSender},
};
use log::*;
use reqwest::Client;

pub const EMAIL_EVENT_BUFFER_SIZE: usize = 25;

/// Logs every payment confirmation that has been handed to the e-mail sender.
pub fn create_email_event_handlers() -> EventHandlers {
    let mut hooks = EventHooks::default();
    hooks.on_payment_confirmed(|email| {
        info!(
            "📬️ Payment confirmation {} for {} ({}) to {}",
            email.message_id, email.data.payable_reference, email.data.company_number, email.email_address
        );
        Box::pin(async {}) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    EventHandlers::new(EMAIL_EVENT_BUFFER_SIZE, hooks)
}

#[derive(Clone)]
pub struct EmailNotifier {
    client: Client,
    send_url: Option<String>,
    events: EventNotifier,
}

impl EmailNotifier {
    /// Without a `send_url`, confirmations are only published to the event hooks.
    pub fn new(send_url: Option<String>, events: EventNotifier) -> Self {
        Self { client: Client::new(), send_url, events }
    }

    async fn deliver(&self, url: &str, email: &PaymentConfirmedEmail) -> Result<(), NotificationError> {
        let response = self.client.post(url).json(email).send().await.map_err(|e| {
            error!("📬️ Could not send e-mail {} to {url}. {e}", email.message_id);
            NotificationError::SendError(e.to_string())
        })?;
        let status = response.status();
        if !status.is_success() {
            error!("📬️ E-mail sender rejected {} with status {status}", email.message_id);
            return Err(NotificationError::SendError(format!("The e-mail sender returned {status}")));
        }
        debug!("📬️ E-mail {} accepted by the e-mail sender", email.message_id);
        Ok(())
    }
}

impl NotificationSender for EmailNotifier {
    async fn send_payment_confirmation(
        &self,
        resource: &PayableResource,
        payment: &PaymentInformation,
    ) -> Result<(), NotificationError> {
        let email = self.events.confirmation_email(resource, payment)?;
        match &self.send_url {
            Some(url) => self.deliver(url, &email).await?,
            None => warn!("📬️ No e-mail sender is configured. {} was not sent", email.message_id),
        }
        // Delivery has already succeeded at this point
        if let Err(e) = self.events.publish(email).await {
            warn!("📬️ Could not publish the payment confirmation for {}. {e}", resource.reference);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::{
        collections::BTreeMap,
        sync::{Arc, Mutex},
    };

    use chrono::Utc;
    use lfp_common::Pence;
    use lfp_pay_engine::db_types::{CreatedBy, Payment, PaymentStatus, TransactionItem};
    use wiremock::{
        matchers::{body_partial_json, method, path},
        Mock,
        MockServer,
        ResponseTemplate,
    };

    use super::*;

    fn resource() -> PayableResource {
        let mut transactions = BTreeMap::new();
        transactions.insert("00378420".to_string(), TransactionItem {
            amount: Pence::from_pounds(150),
            made_up_date: "2017-02-28".into(),
            ..Default::default()
        });
        PayableResource {
            id: 1,
            company_number: "10000024".into(),
            reference: "AB12345678".into(),
            etag: "etag".into(),
            transactions,
            payment: Payment::default(),
            created_by: CreatedBy { id: "user".into(), email: "director@example.com".into(), ..Default::default() },
            created_at: Utc::now(),
            updated_at: Utc::now(),
            e5_command_error: None,
            e5_payment_id: None,
        }
    }

    fn payment() -> PaymentInformation {
        PaymentInformation { payment_id: "P1".into(), status: PaymentStatus::Paid, ..Default::default() }
    }

    async fn email_sender(status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/email-send"))
            .and(body_partial_json(serde_json::json!({
                "email_address": "director@example.com",
                "message_type": "late_filing_penalty_received_email",
                "data": { "payable_reference": "AB12345678", "transaction_id": "00378420" }
            })))
            .respond_with(ResponseTemplate::new(status))
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn confirmation_is_posted_and_then_published() {
        let _ = env_logger::try_init();
        let server = email_sender(200).await;
        let published = Arc::new(Mutex::new(Vec::new()));
        let p2 = published.clone();
        let mut hooks = EventHooks::default();
        hooks.on_payment_confirmed(move |email| {
            let published = p2.clone();
            Box::pin(async move {
                published.lock().unwrap().push(email.message_id);
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
        let handlers = EventHandlers::new(4, hooks);
        let events = EventNotifier::new(handlers.producers(), "https://chs.example.com");
        let handler = handlers.on_payment_confirmed.expect("Hook should be registered");
        let job = tokio::spawn(handler.start_handler());
        let notifier = EmailNotifier::new(Some(format!("{}/email-send", server.uri())), events);
        notifier.send_payment_confirmation(&resource(), &payment()).await.unwrap();
        drop(notifier);
        job.await.unwrap();
        assert_eq!(published.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejected_email_is_a_failed_notification() {
        let server = email_sender(500).await;
        let notifier = EmailNotifier::new(Some(format!("{}/email-send", server.uri())), EventNotifier::default());
        let err = notifier.send_payment_confirmation(&resource(), &payment()).await.unwrap_err();
        assert!(matches!(err, NotificationError::SendError(msg) if msg.contains("500")));
    }

    #[tokio::test]
    async fn unreachable_email_sender_is_a_failed_notification() {
        let notifier = EmailNotifier::new(Some("http://127.0.0.1:1/email-send".into()), EventNotifier::default());
        let err = notifier.send_payment_confirmation(&resource(), &payment()).await.unwrap_err();
        assert!(matches!(err, NotificationError::SendError(_)));
    }

    #[tokio::test]
    async fn without_a_sender_the_email_is_only_logged() {
        let notifier = EmailNotifier::new(None, EventNotifier::default());
        assert!(notifier.send_payment_confirmation(&resource(), &payment()).await.is_ok());
    }
}
