use lfp_common::Pence;
use serde::{Deserialize, Serialize};

use crate::db_types::TransactionType;

/// One E5 transaction, decorated for the penalty payment journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionListItem {
    pub id: String,
    pub etag: String,
    pub kind: String,
    pub is_paid: bool,
    pub is_dca: bool,
    pub due_date: String,
    pub made_up_date: String,
    pub transaction_date: String,
    pub original_amount: Pence,
    pub outstanding: Pence,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
}

impl TransactionListItem {
    pub fn is_part_paid(&self) -> bool {
        self.original_amount != self.outstanding
    }

    /// Unpaid penalties are the only transactions the payer can act on.
    pub fn is_outstanding_penalty(&self) -> bool {
        !self.is_paid && self.transaction_type == TransactionType::Penalty
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionListResponse {
    pub etag: String,
    pub total_results: i64,
    pub items: Vec<TransactionListItem>,
}
