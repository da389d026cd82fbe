use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{EventError, EventHandler, EventProducer, Handler, PaymentConfirmedEmail};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub payment_confirmed_producer: Vec<EventProducer<PaymentConfirmedEmail>>,
}

impl EventProducers {
    /// Sends the e-mail event to every subscriber. Returns the number of subscribers that received it.
    pub async fn publish_payment_confirmed(&self, event: PaymentConfirmedEmail) -> Result<usize, EventError> {
        for producer in &self.payment_confirmed_producer {
            producer.publish_event(event.clone()).await?;
        }
        Ok(self.payment_confirmed_producer.len())
    }
}

pub struct EventHandlers {
    pub on_payment_confirmed: Option<EventHandler<PaymentConfirmedEmail>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_payment_confirmed = hooks.on_payment_confirmed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_payment_confirmed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_payment_confirmed {
            result.payment_confirmed_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_payment_confirmed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_payment_confirmed: Option<Handler<PaymentConfirmedEmail>>,
}

impl EventHooks {
    pub fn on_payment_confirmed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(PaymentConfirmedEmail) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_payment_confirmed = Some(Arc::new(f));
        self
    }
}
