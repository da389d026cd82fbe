use std::{fmt::Display, str::FromStr};

use lfp_common::Pence;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::E5ApiError;

fn require(field: &str, value: &str) -> Result<(), E5ApiError> {
    if value.trim().is_empty() {
        Err(E5ApiError::Validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}

//--------------------------------------     Transactions     ---------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetTransactionsInput {
    pub company_code: String,
    pub company_number: String,
}

impl GetTransactionsInput {
    pub fn new(company_code: impl Into<String>, company_number: impl Into<String>) -> Self {
        Self { company_code: company_code.into(), company_number: company_number.into() }
    }

    pub fn validate(&self) -> Result<(), E5ApiError> {
        require("company_code", &self.company_code)?;
        require("company_number", &self.company_number)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetTransactionsResponse {
    #[serde(default)]
    pub page: Page,
    #[serde(rename = "data", default)]
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Page {
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
    pub number: i64,
}

/// A single accounts-receivable transaction as E5 reports it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Transaction {
    pub company_code: String,
    pub ledger_code: String,
    pub customer_code: String,
    pub transaction_reference: String,
    pub transaction_date: String,
    pub made_up_date: String,
    pub amount: Pence,
    pub outstanding_amount: Pence,
    pub is_paid: bool,
    pub transaction_type: String,
    pub transaction_sub_type: String,
    pub type_description: String,
    pub due_date: String,
    pub account_status: String,
}

//--------------------------------------       Payments       ---------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentInput {
    pub company_code: String,
    #[serde(rename = "customerCode")]
    pub company_number: String,
    pub payment_id: String,
    #[serde(rename = "paymentValue")]
    pub total_value: Pence,
    pub transactions: Vec<CreatePaymentTransaction>,
}

impl CreatePaymentInput {
    pub fn validate(&self) -> Result<(), E5ApiError> {
        require("company_code", &self.company_code)?;
        require("company_number", &self.company_number)?;
        require("payment_id", &self.payment_id)?;
        if self.total_value.is_zero() {
            return Err(E5ApiError::Validation("total_value is required".into()));
        }
        if self.transactions.is_empty() {
            return Err(E5ApiError::Validation("at least one transaction is required".into()));
        }
        self.transactions.iter().try_for_each(CreatePaymentTransaction::validate)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatePaymentTransaction {
    #[serde(rename = "transactionReference")]
    pub reference: String,
    #[serde(rename = "allocationValue")]
    pub value: Pence,
}

impl CreatePaymentTransaction {
    pub fn new(reference: impl Into<String>, value: Pence) -> Self {
        Self { reference: reference.into(), value }
    }

    fn validate(&self) -> Result<(), E5ApiError> {
        require("transaction reference", &self.reference)?;
        if self.value.is_zero() {
            return Err(E5ApiError::Validation(format!("transaction {} has no allocation value", self.reference)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorisePaymentInput {
    pub company_code: String,
    pub payment_id: String,
    #[serde(rename = "paymentCardReference")]
    pub card_reference: String,
    pub authorisation_number: String,
    pub card_type: String,
    #[serde(rename = "emailAddress")]
    pub email: String,
}

impl AuthorisePaymentInput {
    pub fn validate(&self) -> Result<(), E5ApiError> {
        require("company_code", &self.company_code)?;
        require("payment_id", &self.payment_id)?;
        require("email", &self.email)?;
        let email_pattern = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .map_err(|e| E5ApiError::Initialization(format!("Invalid email pattern. {e}")))?;
        if !email_pattern.is_match(&self.email) {
            return Err(E5ApiError::Validation(format!("{} is not a valid email address", self.email)));
        }
        Ok(())
    }
}

/// Body of the `confirm`, `timeout` and `reject` calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentActionInput {
    pub company_code: String,
    pub payment_id: String,
}

impl PaymentActionInput {
    pub fn new(company_code: impl Into<String>, payment_id: impl Into<String>) -> Self {
        Self { company_code: company_code.into(), payment_id: payment_id.into() }
    }

    pub fn validate(&self) -> Result<(), E5ApiError> {
        require("company_code", &self.company_code)?;
        require("payment_id", &self.payment_id)
    }
}

/// The calls that make up a payment session in E5.
///
/// `Create` locks the customer account. `Confirm` allocates the money and unlocks it. `Timeout` and `Reject` unlock the
/// account without allocating anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentAction {
    Create,
    Authorise,
    Confirm,
    Timeout,
    Reject,
}

impl PaymentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentAction::Create => "create",
            PaymentAction::Authorise => "authorise",
            PaymentAction::Confirm => "confirm",
            PaymentAction::Timeout => "timeout",
            PaymentAction::Reject => "reject",
        }
    }
}

impl Display for PaymentAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "authorise" => Ok(Self::Authorise),
            "confirm" => Ok(Self::Confirm),
            "timeout" => Ok(Self::Timeout),
            "reject" => Ok(Self::Reject),
            _ => Err(format!("Invalid payment action: {s}")),
        }
    }
}

//--------------------------------------        Errors        ---------------------------------------------------------

/// The body E5 sends back with any non-200 response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    #[serde(rename = "httpStatusCode", default)]
    pub code: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub message_code: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub debug_message: Option<String>,
    #[serde(default)]
    pub sub_errors: Vec<SubError>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubError {
    pub object: String,
    pub field: String,
    pub rejected_value: String,
    pub message: String,
}

impl Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.status, self.message)?;
        if let Some(code) = &self.message_code {
            write!(f, " ({code})")?;
        }
        if let Some(debug) = &self.debug_message {
            write!(f, ". {debug}")?;
        }
        for sub in &self.sub_errors {
            write!(f, ". {}={} {}", sub.field, sub.rejected_value, sub.message)?;
        }
        Ok(())
    }
}
