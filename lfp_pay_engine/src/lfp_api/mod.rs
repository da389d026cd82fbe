//! # Late filing penalty API
//!
//! The public face of the engine. Each API is generic over the backends it needs, so that the server can plug in real
//! implementations and tests can plug in mocks.
//!
//! * [`PenaltiesApi`] lists a company's E5 transactions and checks whether a set of them can be paid.
//! * [`PayableResourceApi`] creates payable resources and moves them from `pending` to `paid`.
//! * [`SettlementApi`] settles a completed payment: it marks the resource as paid, replays the payment into E5 and sends
//!   the confirmation e-mail.
pub mod errors;
pub mod payable_resource_api;
pub mod payment_objects;
pub mod penalties_api;
pub mod penalty_objects;
pub mod penalty_types;
pub mod settlement_api;

pub use payable_resource_api::PayableResourceApi;
pub use penalties_api::PenaltiesApi;
pub use settlement_api::{SettlementApi, SettlementOrdering, SettlementOutcome};
