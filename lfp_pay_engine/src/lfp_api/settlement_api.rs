//! Settlement of a completed payment.
//!
//! Once the payment provider reports that a payment has been taken, three things happen:
//! 1. The payable resource is marked as paid.
//! 2. The payment is replayed into E5, which takes three calls (create, authorise, confirm).
//! 3. The payer is sent a confirmation e-mail.
//!
//! Before any of that, the resource is claimed for the E5 payment id. The claim is an atomic write, so concurrent
//! requests for the same resource replay at most one payment into E5, and the stored id is what a later unlock acts on.
//!
//! E5 locks the company's account between the create and confirm calls. If any of the three calls fails, the account
//! stays locked. The failed call is recorded against the payable resource and nothing is retried or rolled back.
//! Finance unlock the account during their daily reconciliation, or an operator can call
//! [`SettlementApi::unlock_ledger_account`].
use std::{fmt::Display, str::FromStr};

use e5_client::{
    AuthorisePaymentInput,
    CreatePaymentInput,
    CreatePaymentTransaction,
    E5ApiError,
    PaymentAction,
    PaymentActionInput,
};
use log::*;

use crate::{
    db_types::PayableResource,
    lfp_api::{
        errors::{PayableResourceError, SettlementError},
        payable_resource_api::PayableResourceApi,
        payment_objects::PaymentInformation,
    },
    traits::{FinanceLedger, NotificationError, NotificationSender, PayableResourceManagement},
};

/// How the three settlement tasks are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SettlementOrdering {
    /// Persist, replay into E5 and send the e-mail all at once.
    #[default]
    Concurrent,
    /// Only replay into E5 and send the e-mail once the resource has been marked as paid.
    PersistFirst,
}

impl Display for SettlementOrdering {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettlementOrdering::Concurrent => write!(f, "concurrent"),
            SettlementOrdering::PersistFirst => write!(f, "persist_first"),
        }
    }
}

impl FromStr for SettlementOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "concurrent" => Ok(Self::Concurrent),
            "persist_first" | "persist-first" => Ok(Self::PersistFirst),
            s => Err(format!("Invalid settlement ordering: {s}")),
        }
    }
}

/// The results of the three settlement tasks. A task that was not run is `None`.
#[derive(Debug)]
pub struct SettlementOutcome {
    pub persisted: Result<PayableResource, PayableResourceError>,
    pub ledger: Option<Result<(), SettlementError>>,
    pub notification: Option<Result<(), NotificationError>>,
}

impl SettlementOutcome {
    /// Reduces the outcome to a single result. When more than one task failed, the persistence error wins, then the
    /// E5 error, then the e-mail error.
    pub fn into_result(self) -> Result<PayableResource, SettlementError> {
        let resource = self.persisted?;
        if let Some(Err(e)) = self.ledger {
            return Err(e);
        }
        if let Some(Err(e)) = self.notification {
            return Err(e.into());
        }
        Ok(resource)
    }
}

pub struct SettlementApi<B, L, N> {
    resources: PayableResourceApi<B>,
    ledger: L,
    notifier: N,
    company_code: String,
    ordering: SettlementOrdering,
}

impl<B, L, N> std::fmt::Debug for SettlementApi<B, L, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SettlementApi ({}, {})", self.company_code, self.ordering)
    }
}

impl<B, L, N> SettlementApi<B, L, N> {
    pub fn new(db: B, ledger: L, notifier: N, company_code: &str) -> Self {
        Self {
            resources: PayableResourceApi::new(db),
            ledger,
            notifier,
            company_code: company_code.to_string(),
            ordering: SettlementOrdering::default(),
        }
    }

    pub fn with_ordering(mut self, ordering: SettlementOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn ordering(&self) -> SettlementOrdering {
        self.ordering
    }
}

impl<B, L, N> SettlementApi<B, L, N>
where
    B: PayableResourceManagement,
    L: FinanceLedger,
    N: NotificationSender,
{
    /// Settles a payment against a payable resource.
    ///
    /// The resource is read fresh from storage. If it is already paid, nothing else happens. Otherwise the payment is
    /// checked against the resource, the resource is claimed for the payment's E5 session and the three settlement
    /// tasks are run. Only the request holding the claim gets as far as E5.
    pub async fn settle_payment(
        &self,
        company_number: &str,
        reference: &str,
        payment: &PaymentInformation,
    ) -> Result<PayableResource, SettlementError> {
        let resource = self
            .resources
            .get_payable_resource(company_number, reference)
            .await?
            .ok_or(SettlementError::ResourceNotFound)?;
        if resource.is_paid() {
            info!("🔁️ Payable resource {reference} for {company_number} is already paid. Nothing to settle.");
            return Err(SettlementError::AlreadyPaid);
        }
        payment.validate_for(&resource).map_err(|e| {
            warn!("🔁️ Payment {} is not valid for payable resource {reference}. {e}", payment.payment_id);
            e
        })?;
        let claimed = self.resources.claim_for_settlement(&resource, &payment.e5_payment_id()).await?;
        let outcome = self.run_settlement_tasks(&claimed, payment).await;
        outcome.into_result()
    }

    /// Runs the persist, E5 and e-mail tasks for a resource that has been checked and found to be payable.
    pub async fn run_settlement_tasks(
        &self,
        resource: &PayableResource,
        payment: &PaymentInformation,
    ) -> SettlementOutcome {
        debug!("🔁️ Settling payable resource {} ({})", resource.reference, self.ordering);
        match self.ordering {
            SettlementOrdering::Concurrent => {
                let (notification, persisted, ledger) = tokio::join!(
                    self.notifier.send_payment_confirmation(resource, payment),
                    self.resources.update_as_paid(resource, payment),
                    self.mark_transactions_as_paid(resource, payment),
                );
                SettlementOutcome { persisted, ledger: Some(ledger), notification: Some(notification) }
            },
            SettlementOrdering::PersistFirst => {
                let persisted = self.resources.update_as_paid(resource, payment).await;
                if let Err(e) = &persisted {
                    warn!("🔁️ Not replaying payment for {} into E5. {e}", resource.reference);
                    return SettlementOutcome { persisted, ledger: None, notification: None };
                }
                let (notification, ledger) = tokio::join!(
                    self.notifier.send_payment_confirmation(resource, payment),
                    self.mark_transactions_as_paid(resource, payment),
                );
                SettlementOutcome { persisted, ledger: Some(ledger), notification: Some(notification) }
            },
        }
    }

    /// Replays the payment into E5: create, then authorise, then confirm.
    ///
    /// The first failure is recorded against the resource and returned. No further calls are made.
    pub async fn mark_transactions_as_paid(
        &self,
        resource: &PayableResource,
        payment: &PaymentInformation,
    ) -> Result<(), SettlementError> {
        let payment_id = payment.e5_payment_id();
        let transactions = resource
            .transactions
            .iter()
            .map(|(id, item)| CreatePaymentTransaction::new(id.as_str(), item.amount))
            .collect();
        let create = CreatePaymentInput {
            company_code: self.company_code.clone(),
            company_number: resource.company_number.clone(),
            payment_id: payment_id.clone(),
            total_value: resource.total_amount(),
            transactions,
        };
        if let Err(e) = self.ledger.create_payment(&create).await {
            return Err(self.ledger_failure(resource, PaymentAction::Create, e).await);
        }
        trace!("🔁️ E5 payment {payment_id} created");

        let authorise = AuthorisePaymentInput {
            company_code: self.company_code.clone(),
            payment_id: payment_id.clone(),
            card_reference: payment.external_payment_id.clone(),
            authorisation_number: String::default(),
            card_type: payment.card_type.clone(),
            email: payment.created_by.clone(),
        };
        if let Err(e) = self.ledger.authorise_payment(&authorise).await {
            return Err(self.ledger_failure(resource, PaymentAction::Authorise, e).await);
        }
        trace!("🔁️ E5 payment {payment_id} authorised");

        let confirm = PaymentActionInput::new(self.company_code.as_str(), payment_id.as_str());
        if let Err(e) = self.ledger.confirm_payment(&confirm).await {
            return Err(self.ledger_failure(resource, PaymentAction::Confirm, e).await);
        }
        info!(
            "🔁️ E5 payment {payment_id} confirmed. {} transaction(s) for company {} are marked as paid",
            resource.transactions.len(),
            resource.company_number
        );
        Ok(())
    }

    /// Calls E5's `timeout` or `reject` action for the resource's payment session, releasing the lock on the company's
    /// account. This is never done automatically.
    ///
    /// The session is the one stored when the resource was claimed. If the resource is still unpaid, the claim is
    /// released afterwards so the payment can be settled again.
    pub async fn unlock_ledger_account(
        &self,
        resource: &PayableResource,
        action: PaymentAction,
    ) -> Result<(), SettlementError> {
        if !matches!(action, PaymentAction::Timeout | PaymentAction::Reject) {
            return Err(SettlementError::InvalidUnlockAction(action));
        }
        let payment_id = resource
            .e5_payment_id
            .as_deref()
            .ok_or_else(|| SettlementError::NoLedgerSession(resource.reference.clone()))?;
        let input = PaymentActionInput::new(self.company_code.as_str(), payment_id);
        let result = match action {
            PaymentAction::Timeout => self.ledger.timeout_payment(&input).await,
            _ => self.ledger.reject_payment(&input).await,
        };
        if let Err(e) = result {
            return Err(self.ledger_failure(resource, action, e).await);
        }
        info!("🔁️ E5 payment {payment_id} for company {} has been sent {action}", resource.company_number);
        if !resource.is_paid() {
            self.resources.release_settlement_claim(resource).await.map_err(|e| {
                error!("🔁️ E5 payment {payment_id} was sent {action}, but {} is still claimed. {e}", resource.reference);
                SettlementError::Persistence(e)
            })?;
        }
        Ok(())
    }

    async fn ledger_failure(&self, resource: &PayableResource, action: PaymentAction, e: E5ApiError) -> SettlementError {
        error!(
            "🔁️ E5 {action} call failed for payable resource {} (company {}). The account may be locked. {e}",
            resource.reference, resource.company_number
        );
        match self.resources.record_e5_command_error(resource, action).await {
            Ok(()) => SettlementError::LedgerCommand { action, source: e },
            Err(record_error) => SettlementError::RecordFailure { action, source: record_error },
        }
    }
}
