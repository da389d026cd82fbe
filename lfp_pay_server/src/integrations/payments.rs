//! HTTP client for the payments API.
//!
//! A payment session is described by two resources:
//! * `GET /payments/{id}` carries the status, amount, reference and payer, and
//! * `GET /private/payments/{id}/payment-details` carries the card details that E5 needs.
use std::sync::Arc;

use chrono::{DateTime, Utc};
use lfp_common::Pence;
use lfp_pay_engine::{
    db_types::PaymentStatus,
    lfp_api::payment_objects::PaymentInformation,
    traits::{PaymentProvider, PaymentProviderError},
};
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client,
    Response,
    StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize};

use crate::config::PaymentsApiConfig;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentCreatedBy {
    #[serde(default)]
    pub email: String,
}

/// The parts of the payments API's payment resource that are needed to settle a penalty.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentResource {
    /// Decimal pounds, e.g. `"150.00"`
    pub amount: String,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: PaymentCreatedBy,
    #[serde(default)]
    pub reference: String,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentDetailsResource {
    #[serde(default)]
    pub card_type: String,
    #[serde(default)]
    pub external_payment_id: String,
}

#[derive(Clone)]
pub struct PaymentsApiClient {
    base_url: String,
    client: Arc<Client>,
}

impl PaymentsApiClient {
    pub fn new(config: &PaymentsApiConfig) -> Result<Self, PaymentProviderError> {
        let mut headers = HeaderMap::with_capacity(1);
        let key = HeaderValue::from_str(config.api_key.reveal())
            .map_err(|e| PaymentProviderError::Transport(format!("Invalid payments API key. {e}")))?;
        headers.insert(AUTHORIZATION, key);
        let client =
            Client::builder().default_headers(headers).build().map_err(|e| PaymentProviderError::Transport(e.to_string()))?;
        Ok(Self { base_url: config.base_url.clone(), client: Arc::new(client) })
    }

    pub async fn fetch_payment(&self, payment_id: &str) -> Result<PaymentResource, PaymentProviderError> {
        self.get(payment_id, &format!("/payments/{payment_id}")).await
    }

    pub async fn fetch_payment_details(&self, payment_id: &str) -> Result<PaymentDetailsResource, PaymentProviderError> {
        self.get(payment_id, &format!("/private/payments/{payment_id}/payment-details")).await
    }

    async fn get<T: DeserializeOwned>(&self, payment_id: &str, path: &str) -> Result<T, PaymentProviderError> {
        let url = format!("{}{path}", self.base_url);
        trace!("💳️ GET {url}");
        let response = self.client.get(url).send().await.map_err(|e| {
            error!("💳️ Could not reach the payments API for payment {payment_id}. {e}");
            PaymentProviderError::Transport(e.to_string())
        })?;
        check_response(payment_id, response).await?.json::<T>().await.map_err(|e| {
            error!("💳️ Could not decode the payments API response for {path}. {e}");
            PaymentProviderError::InvalidResponse(e.to_string())
        })
    }
}

async fn check_response(payment_id: &str, response: Response) -> Result<Response, PaymentProviderError> {
    match response.status() {
        StatusCode::OK => Ok(response),
        StatusCode::NOT_FOUND => {
            warn!("💳️ Payment {payment_id} does not exist");
            Err(PaymentProviderError::PaymentNotFound(payment_id.to_string()))
        },
        status => {
            let body = response.text().await.unwrap_or_default();
            error!("💳️ Payments API returned {status} for payment {payment_id}. {body}");
            Err(PaymentProviderError::Transport(format!("Unexpected status {status}")))
        },
    }
}

impl PaymentProvider for PaymentsApiClient {
    async fn get_payment_information(&self, payment_id: &str) -> Result<PaymentInformation, PaymentProviderError> {
        let payment = self.fetch_payment(payment_id).await?;
        let details = self.fetch_payment_details(payment_id).await?;
        let amount = payment.amount.parse::<Pence>().map_err(|e| {
            error!("💳️ Payment {payment_id} has an invalid amount. {e}");
            PaymentProviderError::InvalidResponse(e.to_string())
        })?;
        debug!("💳️ Payment {payment_id} is {} for {amount}", payment.status);
        Ok(PaymentInformation {
            payment_id: payment_id.to_string(),
            reference: payment.reference,
            status: PaymentStatus::from(payment.status),
            amount,
            completed_at: payment.completed_at,
            created_by: payment.created_by.email,
            card_type: details.card_type,
            external_payment_id: details.external_payment_id,
        })
    }
}
