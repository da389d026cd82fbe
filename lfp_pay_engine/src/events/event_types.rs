use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{db_types::PayableResource, lfp_api::payment_objects::PaymentInformation};

pub const PAYMENT_RECEIVED_APP_ID: &str = "lfp-pay-api.late_filing_penalty_received_email";
pub const PAYMENT_RECEIVED_MESSAGE_TYPE: &str = "late_filing_penalty_received_email";
const FILING_DESCRIPTION: &str = "Late Filing Penalty";
const EMAIL_SUBJECT: &str = "Confirmation of your Companies House penalty payment";

/// The template data for the payment confirmation e-mail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEmailData {
    pub company_number: String,
    /// The company name is not looked up, so this carries the company number.
    pub company_name: String,
    pub payable_reference: String,
    pub transaction_id: String,
    pub made_up_date: String,
    pub amount: String,
    pub payment_reference: String,
    pub filing_description: String,
    pub to: String,
    pub subject: String,
    pub chs_url: String,
}

/// Published once a penalty payment has been accepted. Subscribers deliver it to the e-mail sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmedEmail {
    pub app_id: String,
    pub message_id: String,
    pub message_type: String,
    pub data: PaymentEmailData,
    pub email_address: String,
    pub created_at: DateTime<Utc>,
}

impl PaymentConfirmedEmail {
    /// Returns `None` if the resource has no transactions, since there is nothing to confirm.
    pub fn new(resource: &PayableResource, payment: &PaymentInformation, chs_url: &str) -> Option<Self> {
        let (transaction_id, item) = resource.transactions.iter().next()?;
        let email_address = resource.created_by.email.clone();
        let data = PaymentEmailData {
            company_number: resource.company_number.clone(),
            company_name: resource.company_number.clone(),
            payable_reference: resource.reference.clone(),
            transaction_id: transaction_id.clone(),
            made_up_date: long_date(&item.made_up_date),
            amount: item.amount.to_pounds_string(),
            payment_reference: payment.reference.clone(),
            filing_description: FILING_DESCRIPTION.into(),
            to: email_address.clone(),
            subject: EMAIL_SUBJECT.into(),
            chs_url: chs_url.into(),
        };
        let message_id = format!("<{}.{}@companieshouse.gov.uk>", resource.reference, rand::random::<u32>() % 100_000);
        Some(Self {
            app_id: PAYMENT_RECEIVED_APP_ID.into(),
            message_id,
            message_type: PAYMENT_RECEIVED_MESSAGE_TYPE.into(),
            data,
            email_address,
            created_at: Utc::now(),
        })
    }
}

/// `2017-02-28` becomes `28 February 2017`. Anything that isn't an ISO date is passed through untouched.
fn long_date(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map(|d| d.format("%-d %B %Y").to_string()).unwrap_or(date.to_string())
}
