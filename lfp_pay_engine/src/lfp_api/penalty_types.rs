//! The table of E5 transaction (type, sub-type) pairs that count as payable late filing penalties.
//!
//! The table is a TOML document of the form
//!
//! ```toml
//! [types]
//! "1" = ["EJ", "EU", "S1", "A2", "A4"]
//! ```
use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use log::*;
use serde::Deserialize;

use crate::{db_types::TransactionType, lfp_api::errors::PenaltyTypesError};

const DEFAULT_PENALTY_TYPES: &str = r#"
[types]
"1" = ["EJ", "EU", "S1", "A2", "A4"]
"#;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PenaltyTypes {
    types: HashMap<String, HashSet<String>>,
}

impl Default for PenaltyTypes {
    fn default() -> Self {
        Self::from_toml_str(DEFAULT_PENALTY_TYPES).unwrap_or_else(|e| {
            error!("🔎️ Built-in penalty type table is invalid. {e}");
            Self { types: HashMap::new() }
        })
    }
}

impl PenaltyTypes {
    pub fn from_toml_str(s: &str) -> Result<Self, PenaltyTypesError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PenaltyTypesError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let types = Self::from_toml_str(&contents)?;
        info!("🔎️ Loaded {} penalty transaction types from {}", types.types.len(), path.as_ref().display());
        Ok(types)
    }

    pub fn is_penalty(&self, transaction_type: &str, sub_type: &str) -> bool {
        self.types.get(transaction_type).map(|subs| subs.contains(sub_type)).unwrap_or(false)
    }

    /// Unknown pairs are always [`TransactionType::Other`].
    pub fn classify(&self, transaction_type: &str, sub_type: &str) -> TransactionType {
        if self.is_penalty(transaction_type, sub_type) {
            TransactionType::Penalty
        } else {
            TransactionType::Other
        }
    }
}
