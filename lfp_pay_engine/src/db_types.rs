use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use e5_client::PaymentAction;
use lfp_common::Pence;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::helpers::generate_reference;

pub const LATE_FILING_PENALTY_KIND: &str = "late-filing-penalty#late-filing-penalty";

//--------------------------------------   TransactionType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// A late filing penalty that can be paid through this service.
    Penalty,
    #[default]
    Other,
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Penalty => write!(f, "penalty"),
            TransactionType::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(String);

impl FromStr for TransactionType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "penalty" => Ok(Self::Penalty),
            "other" => Ok(Self::Other),
            s => Err(ConversionError(format!("Invalid transaction type: {s}"))),
        }
    }
}

//--------------------------------------   PaymentStatus       ---------------------------------------------------------
/// The payment status of a payable resource. Only the `pending -> paid` transition is ever made by this service, but
/// the payment provider may report other statuses, which are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Other(String),
}

impl PaymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Other(s) => s.as_str(),
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for PaymentStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => Self::Pending,
            "paid" => Self::Paid,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for PaymentStatus {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl Serialize for PaymentStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PaymentStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from(String::deserialize(deserializer)?))
    }
}

//--------------------------------------   TransactionItem     ---------------------------------------------------------
/// A ledger transaction as it is stored against a payable resource. The transaction id is the key of the map that
/// holds it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionItem {
    pub amount: Pence,
    #[serde(default)]
    pub made_up_date: String,
    #[serde(rename = "type", default)]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub is_dca: bool,
}

//--------------------------------------  PayableTransaction   ---------------------------------------------------------
/// A transaction together with its ledger id, as it appears in requests and responses.
///
/// When this comes from a user, only `transaction_id` and `amount` carry any weight. Everything else is replaced with
/// the ledger's values during validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayableTransaction {
    pub transaction_id: String,
    pub amount: Pence,
    #[serde(default)]
    pub made_up_date: String,
    #[serde(rename = "type", default)]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub is_dca: bool,
}

impl PayableTransaction {
    pub fn new<S: Into<String>>(transaction_id: S, amount: Pence) -> Self {
        Self { transaction_id: transaction_id.into(), amount, ..Default::default() }
    }

    pub fn into_parts(self) -> (String, TransactionItem) {
        let item = TransactionItem {
            amount: self.amount,
            made_up_date: self.made_up_date,
            transaction_type: self.transaction_type,
            is_paid: self.is_paid,
            is_dca: self.is_dca,
        };
        (self.transaction_id, item)
    }

    pub fn from_parts(transaction_id: &str, item: &TransactionItem) -> Self {
        Self {
            transaction_id: transaction_id.to_string(),
            amount: item.amount,
            made_up_date: item.made_up_date.clone(),
            transaction_type: item.transaction_type,
            is_paid: item.is_paid,
            is_dca: item.is_dca,
        }
    }
}

//--------------------------------------      CreatedBy        ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedBy {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub forename: String,
    #[serde(default)]
    pub surname: String,
}

//--------------------------------------       Payment         ---------------------------------------------------------
/// The payment block of a payable resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Pence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl Payment {
    pub fn is_paid(&self) -> bool {
        self.status == PaymentStatus::Paid
    }
}

//--------------------------------------  PayableResourceLinks ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayableResourceLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub payment: String,
    pub resume_journey_uri: String,
}

//--------------------------------------   PayableResource     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayableResource {
    pub id: i64,
    pub company_number: String,
    pub reference: String,
    pub etag: String,
    pub transactions: BTreeMap<String, TransactionItem>,
    pub payment: Payment,
    pub created_by: CreatedBy,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// The last E5 call that failed for this resource, if any.
    pub e5_command_error: Option<PaymentAction>,
    /// The E5 payment session claimed for this resource. Only one settlement can hold it at a time.
    pub e5_payment_id: Option<String>,
}

impl PayableResource {
    pub fn is_paid(&self) -> bool {
        self.payment.is_paid()
    }

    /// The sum of all the transactions on the resource. This is what the payer owes.
    pub fn total_amount(&self) -> Pence {
        self.transactions.values().map(|t| t.amount).sum()
    }

    pub fn transaction_list(&self) -> Vec<PayableTransaction> {
        self.transactions.iter().map(|(id, item)| PayableTransaction::from_parts(id, item)).collect()
    }

    pub fn self_link(&self) -> String {
        payable_self_link(&self.company_number, &self.reference)
    }

    pub fn links(&self) -> PayableResourceLinks {
        let self_link = self.self_link();
        let payment = format!("{self_link}/payment");
        let first_transaction = self.transactions.keys().next().map(String::as_str).unwrap_or_default();
        let resume_journey_uri = format!(
            "/late-filing-penalty/company/{}/penalty/{first_transaction}/view-penalties",
            self.company_number
        );
        PayableResourceLinks { self_link, payment, resume_journey_uri }
    }
}

pub fn payable_self_link(company_number: &str, reference: &str) -> String {
    format!("/company/{company_number}/penalties/late-filing/payable/{reference}")
}

//--------------------------------------  NewPayableResource   ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewPayableResource {
    pub company_number: String,
    /// Generated when the struct is created. Two upper-case letters followed by 8 digits.
    pub reference: String,
    pub transactions: Vec<PayableTransaction>,
    pub created_by: CreatedBy,
}

impl NewPayableResource {
    pub fn new(company_number: &str, created_by: CreatedBy, transactions: Vec<PayableTransaction>) -> Self {
        Self {
            company_number: company_number.to_uppercase(),
            reference: generate_reference(),
            transactions,
            created_by,
        }
    }

    pub fn transaction_map(&self) -> BTreeMap<String, TransactionItem> {
        self.transactions.iter().cloned().map(PayableTransaction::into_parts).collect()
    }
}
