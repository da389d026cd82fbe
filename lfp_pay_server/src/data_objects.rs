use std::fmt::Display;

use chrono::{DateTime, Utc};
use lfp_pay_engine::db_types::{CreatedBy, PayableResource, PayableResourceLinks, PayableTransaction, Payment};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::ServerError;

/// A company number taken from the request path. Company numbers are always upper case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyNumber(String);

impl CompanyNumber {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for CompanyNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CompanyNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self(s.trim().to_uppercase()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompanyPath {
    pub company_number: CompanyNumber,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PayablePath {
    pub company_number: CompanyNumber,
    pub payable_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerActionPath {
    pub company_number: CompanyNumber,
    pub payable_id: String,
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePayableRequest {
    #[serde(default)]
    pub transactions: Vec<PayableTransaction>,
}

impl CreatePayableRequest {
    /// At least one transaction is needed, and every transaction needs an id and a positive amount.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.transactions.is_empty() {
            return Err(ServerError::InvalidRequestBody("No transactions were provided".into()));
        }
        if let Some(tx) = self.transactions.iter().find(|t| t.transaction_id.trim().is_empty() || t.amount.value() <= 0)
        {
            return Err(ServerError::InvalidRequestBody(format!(
                "Transaction '{}' needs an id and an amount greater than zero",
                tx.transaction_id
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPayableLinks {
    #[serde(rename = "self")]
    pub self_link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPayableResponse {
    pub id: String,
    pub links: CreatedPayableLinks,
}

impl From<&PayableResource> for CreatedPayableResponse {
    fn from(resource: &PayableResource) -> Self {
        Self { id: resource.reference.clone(), links: CreatedPayableLinks { self_link: resource.self_link() } }
    }
}

/// The REST view of a payable resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayableResourceResponse {
    pub company_number: String,
    pub reference: String,
    pub etag: String,
    pub transactions: Vec<PayableTransaction>,
    pub created_at: DateTime<Utc>,
    pub created_by: CreatedBy,
    pub links: PayableResourceLinks,
    pub payment: Payment,
}

impl From<PayableResource> for PayableResourceResponse {
    fn from(resource: PayableResource) -> Self {
        let transactions = resource.transaction_list();
        let links = resource.links();
        Self {
            company_number: resource.company_number,
            reference: resource.reference,
            etag: resource.etag,
            transactions,
            created_at: resource.created_at,
            created_by: resource.created_by,
            links,
            payment: resource.payment,
        }
    }
}

/// Sent by the payment service once the payer has completed a payment session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchPaymentRequest {
    /// The payment session id.
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_end_time: Option<DateTime<Utc>>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self { message: "HEALTHY".into(), maintenance_end_time: None }
    }

    pub fn maintenance(until: DateTime<Utc>) -> Self {
        Self { message: "UNHEALTHY - PLANNED MAINTENANCE".into(), maintenance_end_time: Some(until) }
    }
}
