use chrono::{DateTime, Utc};
use lfp_common::Pence;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{PayableResource, Payment, PaymentStatus},
    lfp_api::errors::PaymentValidationError,
};

const PAYMENT_DESCRIPTION: &str = "Late Filing Penalty";
const PAYMENT_DETAILS_KIND: &str = "payment-details#payment-details";

//--------------------------------------  PaymentInformation   ---------------------------------------------------------
/// What the payment provider knows about a payment session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInformation {
    /// The payment provider's id for the session. The E5 payment id is derived from this.
    pub payment_id: String,
    pub reference: String,
    pub status: PaymentStatus,
    pub amount: Pence,
    pub completed_at: Option<DateTime<Utc>>,
    /// E-mail address of the payer
    pub created_by: String,
    pub card_type: String,
    pub external_payment_id: String,
}

impl PaymentInformation {
    /// Checks that the provider has taken the full amount owed on the resource.
    pub fn validate_for(&self, resource: &PayableResource) -> Result<(), PaymentValidationError> {
        if self.status != PaymentStatus::Paid {
            return Err(PaymentValidationError::NotPaid(self.status.to_string()));
        }
        let owed = resource.total_amount();
        if self.amount != owed {
            return Err(PaymentValidationError::AmountMismatch { paid: self.amount, owed });
        }
        Ok(())
    }

    /// The payment block to store against the resource once this payment has been accepted.
    pub fn as_payment(&self) -> Payment {
        Payment {
            status: self.status.clone(),
            amount: Some(self.amount),
            reference: Some(self.reference.clone()),
            paid_at: self.completed_at,
        }
    }

    /// The id of the payment session in E5. The `X` prefix keeps digital payments apart from ones made elsewhere.
    pub fn e5_payment_id(&self) -> String {
        format!("X{}", self.payment_id)
    }
}

//--------------------------------------    PaymentDetails     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cost {
    pub amount: String,
    pub available_payment_methods: Vec<String>,
    pub class_of_payment: Vec<String>,
    pub description: String,
    pub description_identifier: String,
    pub kind: String,
    pub resource_kind: String,
    pub product_type: String,
}

impl Cost {
    pub fn late_filing_penalty(amount: Pence) -> Self {
        Self {
            amount: amount.to_pounds_string(),
            available_payment_methods: vec!["credit-card".into()],
            class_of_payment: vec!["penalty".into()],
            description: PAYMENT_DESCRIPTION.into(),
            description_identifier: "late-filing-penalty".into(),
            kind: "cost#cost".into(),
            resource_kind: crate::db_types::LATE_FILING_PENALTY_KIND.into(),
            product_type: "late-filing-penalty".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetailsLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub resource: String,
}

/// The view of a payable resource that the payment provider consumes to start a payment session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub description: String,
    pub etag: String,
    pub kind: String,
    pub links: PaymentDetailsLinks,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_reference: Option<String>,
    pub status: PaymentStatus,
    pub company_number: String,
    pub items: Vec<Cost>,
}

impl From<&PayableResource> for PaymentDetails {
    fn from(resource: &PayableResource) -> Self {
        let links = resource.links();
        let items = resource.transactions.values().map(|t| Cost::late_filing_penalty(t.amount)).collect();
        Self {
            description: PAYMENT_DESCRIPTION.into(),
            etag: resource.etag.clone(),
            kind: PAYMENT_DETAILS_KIND.into(),
            links: PaymentDetailsLinks { self_link: links.payment, resource: links.self_link },
            paid_at: resource.payment.paid_at,
            payment_reference: resource.payment.reference.clone(),
            status: resource.payment.status.clone(),
            company_number: resource.company_number.clone(),
            items,
        }
    }
}
