use std::{collections::HashMap, fmt::Debug};

use e5_client::{GetTransactionsInput, GetTransactionsResponse};
use log::*;

use crate::{
    db_types::{PayableTransaction, TransactionType, LATE_FILING_PENALTY_KIND},
    helpers::generate_etag,
    lfp_api::{
        errors::{PayabilityError, PenaltiesApiError},
        penalty_objects::{TransactionListItem, TransactionListResponse},
        penalty_types::PenaltyTypes,
    },
    traits::FinanceLedger,
};

/// E5 account status for accounts that have been handed to a debt collecting agency.
const DCA_ACCOUNT_STATUS: &str = "DCA";

/// `PenaltiesApi` reads a company's transactions from E5 and decides which of them can be paid.
pub struct PenaltiesApi<L> {
    ledger: L,
    penalty_types: PenaltyTypes,
    company_code: String,
}

impl<L> Debug for PenaltiesApi<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PenaltiesApi ({})", self.company_code)
    }
}

impl<L> PenaltiesApi<L> {
    pub fn new(ledger: L, penalty_types: PenaltyTypes, company_code: &str) -> Self {
        Self { ledger, penalty_types, company_code: company_code.to_string() }
    }

    pub fn company_code(&self) -> &str {
        &self.company_code
    }

    /// Classifies each E5 transaction as a penalty or not, and decorates it for the payment journey.
    pub fn map_transactions(&self, response: GetTransactionsResponse) -> TransactionListResponse {
        let items = response
            .transactions
            .into_iter()
            .map(|tx| TransactionListItem {
                transaction_type: self.penalty_types.classify(&tx.transaction_type, &tx.transaction_sub_type),
                id: tx.transaction_reference,
                etag: generate_etag(),
                kind: LATE_FILING_PENALTY_KIND.to_string(),
                is_paid: tx.is_paid,
                is_dca: tx.account_status == DCA_ACCOUNT_STATUS,
                due_date: tx.due_date,
                made_up_date: tx.made_up_date,
                transaction_date: tx.transaction_date,
                original_amount: tx.amount,
                outstanding: tx.outstanding_amount,
            })
            .collect();
        TransactionListResponse { etag: generate_etag(), total_results: response.page.total_elements, items }
    }
}

impl<L> PenaltiesApi<L>
where L: FinanceLedger
{
    pub async fn get_penalties(&self, company_number: &str) -> Result<TransactionListResponse, PenaltiesApiError> {
        let input = GetTransactionsInput::new(self.company_code.as_str(), company_number);
        let response = self.ledger.get_transactions(&input).await.map_err(|e| {
            error!("🔎️ Error getting transaction list for {company_number}. {e}");
            e
        })?;
        let result = self.map_transactions(response);
        info!("🔎️ Fetched {} transactions from E5 for company {company_number}", result.items.len());
        Ok(result)
    }

    pub async fn get_transaction_for_penalty(
        &self,
        company_number: &str,
        penalty: &str,
    ) -> Result<TransactionListItem, PenaltiesApiError> {
        self.get_penalties(company_number).await?.items.into_iter().find(|t| t.id == penalty).ok_or_else(|| {
            PenaltiesApiError::PenaltyNotFound { company_number: company_number.to_string(), penalty: penalty.to_string() }
        })
    }

    /// Checks the claimed transactions against E5, and returns them with the ledger's view of their type, made-up
    /// date, paid and DCA flags. The claimed amount is kept, since it has been checked against the outstanding amount.
    ///
    /// The whole batch fails on the first transaction that cannot be paid.
    pub async fn transactions_are_payable(
        &self,
        company_number: &str,
        claimed: &[PayableTransaction],
    ) -> Result<Vec<PayableTransaction>, PayabilityError> {
        let penalties = self.get_penalties(company_number).await?;
        check_payable(company_number, &penalties, claimed)
    }
}

fn check_payable(
    company_number: &str,
    penalties: &TransactionListResponse,
    claimed: &[PayableTransaction],
) -> Result<Vec<PayableTransaction>, PayabilityError> {
    let outstanding = penalties.items.iter().filter(|t| t.is_outstanding_penalty()).count();
    if outstanding > 1 {
        info!("🔎️ Company {company_number} has {outstanding} outstanding penalties. Only one may be paid at a time.");
        return Err(PayabilityError::MultiplePenalties);
    }
    let ledger = penalties.items.iter().map(|t| (t.id.as_str(), t)).collect::<HashMap<_, _>>();
    claimed
        .iter()
        .map(|claim| {
            let id = claim.transaction_id.clone();
            let Some(tx) = ledger.get(claim.transaction_id.as_str()) else {
                info!("🔎️ Disallowing payment of {id} for {company_number}. It does not exist in E5");
                return Err(PayabilityError::TransactionDoesNotExist(id));
            };
            if tx.is_part_paid() {
                info!("🔎️ Disallowing payment of {id} for {company_number}. It is already part paid");
                return Err(PayabilityError::TransactionIsPartPaid(id));
            }
            if tx.is_paid {
                info!("🔎️ Disallowing payment of {id} for {company_number}. It is already paid");
                return Err(PayabilityError::TransactionIsPaid(id));
            }
            if tx.transaction_type != TransactionType::Penalty {
                info!("🔎️ Disallowing payment of {id} for {company_number}. It is not a penalty");
                return Err(PayabilityError::TransactionNotPayable(id));
            }
            if tx.outstanding != claim.amount {
                info!(
                    "🔎️ Disallowing payment of {id} for {company_number}. Attempted {}, but {} is outstanding",
                    claim.amount, tx.outstanding
                );
                return Err(PayabilityError::TransactionAmountMismatch {
                    id,
                    claimed: claim.amount,
                    outstanding: tx.outstanding,
                });
            }
            if tx.is_dca {
                info!("🔎️ Disallowing payment of {id} for {company_number}. It is with a debt collecting agency");
                return Err(PayabilityError::TransactionDca(id));
            }
            Ok(PayableTransaction {
                transaction_id: id,
                amount: claim.amount,
                made_up_date: tx.made_up_date.clone(),
                transaction_type: tx.transaction_type,
                is_paid: tx.is_paid,
                is_dca: tx.is_dca,
            })
        })
        .collect()
}
