use std::fmt::Debug;

use e5_client::PaymentAction;
use log::*;

use crate::{
    db_types::{CreatedBy, NewPayableResource, PayableResource, PayableTransaction},
    lfp_api::{
        errors::PayableResourceError,
        payment_objects::{PaymentDetails, PaymentInformation},
    },
    traits::{PayableResourceManagement, PaymentUpdateResult, SettlementClaim},
};

/// `PayableResourceApi` owns the life cycle of a payable resource, from creation through to the single
/// `pending -> paid` transition.
pub struct PayableResourceApi<B> {
    db: B,
}

impl<B> Debug for PayableResourceApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PayableResourceApi")
    }
}

impl<B> PayableResourceApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> PayableResourceApi<B>
where B: PayableResourceManagement
{
    /// Stores a new payable resource for transactions that have already been checked against E5.
    pub async fn create(
        &self,
        company_number: &str,
        created_by: CreatedBy,
        transactions: Vec<PayableTransaction>,
    ) -> Result<PayableResource, PayableResourceError> {
        let new_resource = NewPayableResource::new(company_number, created_by, transactions);
        let resource = self.db.insert_payable_resource(new_resource).await?;
        info!(
            "💷️ Created payable resource {} for company {} with {} transaction(s)",
            resource.reference,
            resource.company_number,
            resource.transactions.len()
        );
        Ok(resource)
    }

    pub async fn get_payable_resource(
        &self,
        company_number: &str,
        reference: &str,
    ) -> Result<Option<PayableResource>, PayableResourceError> {
        let resource = self.db.fetch_payable_resource(company_number, reference).await.map_err(|e| {
            error!("💷️ Could not fetch payable resource {reference} for {company_number}. {e}");
            e
        })?;
        if resource.is_none() {
            debug!("💷️ Payable resource {reference} for {company_number} does not exist");
        }
        Ok(resource)
    }

    /// Moves the resource to `paid`, storing the payment details from the provider.
    ///
    /// The resource is re-read first, so a resource that is already paid is rejected without a write. The write itself
    /// is conditional on the stored status not being `paid`, so a concurrent caller that got there first also results in
    /// [`PayableResourceError::AlreadyPaid`].
    pub async fn update_as_paid(
        &self,
        resource: &PayableResource,
        payment: &PaymentInformation,
    ) -> Result<PayableResource, PayableResourceError> {
        let company_number = resource.company_number.as_str();
        let reference = resource.reference.as_str();
        let current = self
            .get_payable_resource(company_number, reference)
            .await?
            .ok_or(PayableResourceError::ResourceNotFound)?;
        if current.is_paid() {
            warn!(
                "💷️ Payable resource {reference} for {company_number} has already been paid. Payment reference: {}",
                current.payment.reference.as_deref().unwrap_or("none")
            );
            return Err(PayableResourceError::AlreadyPaid);
        }
        match self.db.update_payment_details(company_number, reference, &payment.as_payment()).await? {
            PaymentUpdateResult::Updated(updated) => {
                info!("💷️ Payable resource {reference} for {company_number} is now paid ({})", payment.reference);
                Ok(updated)
            },
            PaymentUpdateResult::AlreadyPaid => {
                warn!("💷️ Payable resource {reference} was paid by another request while this one was in flight");
                Err(PayableResourceError::AlreadyPaid)
            },
            PaymentUpdateResult::NotFound => Err(PayableResourceError::ResourceNotFound),
        }
    }

    /// Reserves the resource for a single settlement before anything is sent to E5.
    ///
    /// The E5 payment id is stored with the claim, so the session can still be found if marking the resource as paid
    /// fails later on. A resource that is paid, or claimed by another settlement, is rejected.
    pub async fn claim_for_settlement(
        &self,
        resource: &PayableResource,
        e5_payment_id: &str,
    ) -> Result<PayableResource, PayableResourceError> {
        let company_number = resource.company_number.as_str();
        let reference = resource.reference.as_str();
        match self.db.claim_for_settlement(company_number, reference, e5_payment_id).await? {
            SettlementClaim::Claimed(claimed) => {
                debug!("💷️ Payable resource {reference} for {company_number} claimed by E5 payment {e5_payment_id}");
                Ok(claimed)
            },
            SettlementClaim::AlreadyClaimed(other) => {
                warn!("💷️ Payable resource {reference} is already being settled by E5 payment {other}");
                Err(PayableResourceError::SettlementInProgress(other))
            },
            SettlementClaim::AlreadyPaid => {
                warn!("💷️ Payable resource {reference} was paid before it could be claimed for {e5_payment_id}");
                Err(PayableResourceError::AlreadyPaid)
            },
            SettlementClaim::NotFound => Err(PayableResourceError::ResourceNotFound),
        }
    }

    /// Lets an unpaid resource be settled again, once its E5 session has been timed out or rejected.
    pub async fn release_settlement_claim(&self, resource: &PayableResource) -> Result<bool, PayableResourceError> {
        let released = self.db.release_settlement_claim(&resource.company_number, &resource.reference).await?;
        if released {
            info!("💷️ Settlement claim on payable resource {} released", resource.reference);
        }
        Ok(released)
    }

    /// Records the E5 call that failed against the resource.
    pub async fn record_e5_command_error(
        &self,
        resource: &PayableResource,
        action: PaymentAction,
    ) -> Result<(), PayableResourceError> {
        self.db.save_e5_error(&resource.company_number, &resource.reference, action).await.map_err(|e| {
            error!(
                "💷️ Could not record failed E5 {action} call against payable resource {} for {}. {e}",
                resource.reference, resource.company_number
            );
            e
        })?;
        info!("💷️ Recorded failed E5 {action} call against payable resource {}", resource.reference);
        Ok(())
    }

    /// The view of the resource that the payment provider uses to start a payment session.
    pub async fn payment_details(
        &self,
        company_number: &str,
        reference: &str,
    ) -> Result<PaymentDetails, PayableResourceError> {
        let resource = self
            .get_payable_resource(company_number, reference)
            .await?
            .ok_or(PayableResourceError::ResourceNotFound)?;
        Self::payment_details_for(&resource)
    }

    /// As [`Self::payment_details`], for a resource that has already been loaded.
    pub fn payment_details_for(resource: &PayableResource) -> Result<PaymentDetails, PayableResourceError> {
        let details = PaymentDetails::from(resource);
        if details.items.is_empty() {
            error!(
                "💷️ Payable resource {} for {} has no transactions to pay for",
                resource.reference, resource.company_number
            );
            return Err(PayableResourceError::NoPaymentItems(resource.reference.clone()));
        }
        Ok(details)
    }
}
