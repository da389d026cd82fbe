mod pence;

pub mod op;
mod secret;

pub use pence::{Pence, PenceConversionError};
pub use secret::Secret;
