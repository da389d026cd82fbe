use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
    Response,
    StatusCode,
};
use serde::Serialize;

use crate::{
    config::E5Config,
    data_objects::{
        ApiErrorResponse,
        AuthorisePaymentInput,
        CreatePaymentInput,
        GetTransactionsInput,
        GetTransactionsResponse,
        PaymentAction,
        PaymentActionInput,
    },
    E5ApiError,
};

/// Transactions are always requested from this date onwards.
const TRANSACTIONS_FROM_DATE: &str = "1990-01-01";

#[derive(Clone)]
pub struct E5Client {
    config: E5Config,
    client: Arc<Client>,
}

impl E5Client {
    pub fn new(config: E5Config) -> Result<Self, E5ApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| E5ApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    /// Fetches every transaction on the company's account. An account with no transactions is not an error.
    pub async fn get_transactions(&self, input: &GetTransactionsInput) -> Result<GetTransactionsResponse, E5ApiError> {
        input.validate()?;
        let path = format!("/arTransactions/{}", input.company_number);
        let params = [("companyCode", input.company_code.as_str()), ("fromDate", TRANSACTIONS_FROM_DATE)];
        debug!("🧾️ Fetching transactions for company {}", input.company_number);
        let response = self.send_request::<()>(Method::GET, &path, &params, None).await?;
        check_response_for_error(response).await?.json::<GetTransactionsResponse>().await.map_err(|e| {
            error!("🧾️ Could not decode transactions for company {}. {e}", input.company_number);
            E5ApiError::FailedToReadBody
        })
    }

    /// Opens a payment session. This locks the customer account in E5 until the session is confirmed, timed out or
    /// rejected. Calling this twice creates two sessions.
    pub async fn create_payment(&self, input: &CreatePaymentInput) -> Result<(), E5ApiError> {
        input.validate()?;
        let response = self.send_request(Method::POST, "/arTransactions/payment", &[], Some(input)).await?;
        info!(
            "🧾️ Response {} received after creating payment {} for company {} ({} over {} transactions)",
            response.status(),
            input.payment_id,
            input.company_number,
            input.total_value,
            input.transactions.len()
        );
        check_response_for_error(response).await.map(|_| ())
    }

    /// Marks the payment as authorised by the payment provider. The customer account stays locked.
    pub async fn authorise_payment(&self, input: &AuthorisePaymentInput) -> Result<(), E5ApiError> {
        input.validate()?;
        let response = self.send_request(Method::POST, "/arTransactions/payment/authorise", &[], Some(input)).await?;
        info!("🧾️ Response {} received after authorising payment {}", response.status(), input.payment_id);
        check_response_for_error(response).await.map(|_| ())
    }

    /// Allocates the money in E5 and unlocks the customer account.
    pub async fn confirm_payment(&self, input: &PaymentActionInput) -> Result<(), E5ApiError> {
        self.payment_action(PaymentAction::Confirm, input).await
    }

    /// Unlocks the customer account.
    pub async fn timeout_payment(&self, input: &PaymentActionInput) -> Result<(), E5ApiError> {
        self.payment_action(PaymentAction::Timeout, input).await
    }

    /// Rejects the payment altogether and unlocks the customer account.
    pub async fn reject_payment(&self, input: &PaymentActionInput) -> Result<(), E5ApiError> {
        self.payment_action(PaymentAction::Reject, input).await
    }

    async fn payment_action(&self, action: PaymentAction, input: &PaymentActionInput) -> Result<(), E5ApiError> {
        input.validate()?;
        let path = format!("/arTransactions/payment/{action}");
        info!("🧾️ Sending {action} request to E5 for payment {}", input.payment_id);
        let response = self.send_request(Method::POST, &path, &[], Some(input)).await?;
        info!("🧾️ Response {} received from E5 for {action} of payment {}", response.status(), input.payment_id);
        check_response_for_error(response).await.map(|_| ())
    }

    async fn send_request<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<Response, E5ApiError> {
        let url = self.url(path);
        trace!("🧾️ Sending {method} request: {url}");
        let mut req =
            self.client.request(method.clone(), url).query(&[("ADV_userName", self.config.username.as_str())]);
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        req.send().await.map_err(|e| {
            error!("🧾️ Transport error calling E5 ({method} {path}). {e}");
            E5ApiError::Transport(e.to_string())
        })
    }
}

/// Passes a 200 response through. Anything else is logged from E5's error body and classified by status code. If the
/// error body cannot be read, the status is lost and [`E5ApiError::FailedToReadBody`] is returned instead.
async fn check_response_for_error(response: Response) -> Result<Response, E5ApiError> {
    let status = response.status();
    if status == StatusCode::OK {
        return Ok(response);
    }
    let body = response.json::<ApiErrorResponse>().await.map_err(|e| {
        error!("🧾️ E5 responded with {status}, and the error body could not be read. {e}");
        E5ApiError::FailedToReadBody
    })?;
    error!("🧾️ Error response from E5 ({status}). {body}");
    match status {
        StatusCode::BAD_REQUEST => Err(E5ApiError::BadRequest),
        StatusCode::NOT_FOUND => Err(E5ApiError::NotFound),
        StatusCode::INTERNAL_SERVER_ERROR => Err(E5ApiError::InternalServer),
        s => Err(E5ApiError::UnexpectedServerError(s.as_u16())),
    }
}
