//! Late Filing Penalty Payment Engine
//!
//! This library holds the business logic for paying late filing penalties. It knows nothing about HTTP. The server
//! crate wires it up to actix-web.
//!
//! The library is divided into these parts:
//! 1. Storage ([`SqliteDatabase`]). Payable resources are kept in SQLite. The storage contract is
//!    [`traits::PayableResourceManagement`], so other backends can be added without touching the API layer. The types
//!    that are stored are defined in [`mod@db_types`] and are public.
//! 2. The public API ([`mod@lfp_api`]). [`PenaltiesApi`] checks claims against E5, [`PayableResourceApi`] manages
//!    the `pending -> paid` transition and [`SettlementApi`] replays payments into E5.
//! 3. Events ([`mod@events`]). When a payment has been settled, a confirmation e-mail event is published. Hooks can
//!    subscribe to it.
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod lfp_api;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use lfp_api::{
    errors::{PayabilityError, PayableResourceError, PenaltiesApiError, SettlementError},
    PayableResourceApi,
    PenaltiesApi,
    SettlementApi,
    SettlementOrdering,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
