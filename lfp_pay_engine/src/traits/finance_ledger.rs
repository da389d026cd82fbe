use e5_client::{
    AuthorisePaymentInput,
    CreatePaymentInput,
    E5ApiError,
    E5Client,
    GetTransactionsInput,
    GetTransactionsResponse,
    PaymentActionInput,
};

/// The subset of the E5 API the engine relies on.
#[allow(async_fn_in_trait)]
pub trait FinanceLedger {
    async fn get_transactions(&self, input: &GetTransactionsInput) -> Result<GetTransactionsResponse, E5ApiError>;
    async fn create_payment(&self, input: &CreatePaymentInput) -> Result<(), E5ApiError>;
    async fn authorise_payment(&self, input: &AuthorisePaymentInput) -> Result<(), E5ApiError>;
    async fn confirm_payment(&self, input: &PaymentActionInput) -> Result<(), E5ApiError>;
    async fn timeout_payment(&self, input: &PaymentActionInput) -> Result<(), E5ApiError>;
    async fn reject_payment(&self, input: &PaymentActionInput) -> Result<(), E5ApiError>;
}

impl FinanceLedger for E5Client {
    async fn get_transactions(&self, input: &GetTransactionsInput) -> Result<GetTransactionsResponse, E5ApiError> {
        E5Client::get_transactions(self, input).await
    }

    async fn create_payment(&self, input: &CreatePaymentInput) -> Result<(), E5ApiError> {
        E5Client::create_payment(self, input).await
    }

    async fn authorise_payment(&self, input: &AuthorisePaymentInput) -> Result<(), E5ApiError> {
        E5Client::authorise_payment(self, input).await
    }

    async fn confirm_payment(&self, input: &PaymentActionInput) -> Result<(), E5ApiError> {
        E5Client::confirm_payment(self, input).await
    }

    async fn timeout_payment(&self, input: &PaymentActionInput) -> Result<(), E5ApiError> {
        E5Client::timeout_payment(self, input).await
    }

    async fn reject_payment(&self, input: &PaymentActionInput) -> Result<(), E5ApiError> {
        E5Client::reject_payment(self, input).await
    }
}
