//! Clients for the services around the payment server.
pub mod email;
pub mod payments;
