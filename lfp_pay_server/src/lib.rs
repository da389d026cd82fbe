//! # Late filing penalty payment server
//! The REST front end of the late filing penalty payment engine. It is responsible for:
//! * Listing a company's E5 transactions and which of them are payable penalties.
//! * Creating payable resources for the penalties a signed-in user wants to pay.
//! * Settling payments reported by the payment service, by marking the resource as paid and replaying the payment
//!   into E5.
//! * Reporting whether E5 is in a maintenance window.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! See [routes](routes/index.html).
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod maintenance;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
