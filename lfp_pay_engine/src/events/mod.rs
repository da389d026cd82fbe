//! Engine events and the hooks that subscribe to them.
//!
//! The only event at present is [`PaymentConfirmedEmail`], published by [`EventNotifier`] once a payment has been
//! settled. The server delivers the message to the e-mail sender itself and subscribes to the event to log it.
mod channel;
mod event_types;
mod hooks;
mod notifier;

pub use channel::{EventError, EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
pub use notifier::EventNotifier;
