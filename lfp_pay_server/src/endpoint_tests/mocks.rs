use e5_client::{
    AuthorisePaymentInput,
    CreatePaymentInput,
    E5ApiError,
    GetTransactionsInput,
    GetTransactionsResponse,
    PaymentAction,
    PaymentActionInput,
};
use lfp_pay_engine::{
    db_types::{NewPayableResource, PayableResource, Payment},
    lfp_api::payment_objects::PaymentInformation,
    traits::{
        FinanceLedger,
        NotificationError,
        NotificationSender,
        PayableResourceManagement,
        PayableStoreError,
        PaymentProvider,
        PaymentProviderError,
        PaymentUpdateResult,
        SettlementClaim,
    },
};
use mockall::mock;

mock! {
    pub Store {}
    impl PayableResourceManagement for Store {
        async fn insert_payable_resource(&self, resource: NewPayableResource) -> Result<PayableResource, PayableStoreError>;
        async fn fetch_payable_resource(&self, company_number: &str, reference: &str) -> Result<Option<PayableResource>, PayableStoreError>;
        async fn update_payment_details(&self, company_number: &str, reference: &str, payment: &Payment) -> Result<PaymentUpdateResult, PayableStoreError>;
        async fn claim_for_settlement(&self, company_number: &str, reference: &str, e5_payment_id: &str) -> Result<SettlementClaim, PayableStoreError>;
        async fn release_settlement_claim(&self, company_number: &str, reference: &str) -> Result<bool, PayableStoreError>;
        async fn save_e5_error(&self, company_number: &str, reference: &str, action: PaymentAction) -> Result<(), PayableStoreError>;
    }
}

mock! {
    pub Ledger {}
    impl FinanceLedger for Ledger {
        async fn get_transactions(&self, input: &GetTransactionsInput) -> Result<GetTransactionsResponse, E5ApiError>;
        async fn create_payment(&self, input: &CreatePaymentInput) -> Result<(), E5ApiError>;
        async fn authorise_payment(&self, input: &AuthorisePaymentInput) -> Result<(), E5ApiError>;
        async fn confirm_payment(&self, input: &PaymentActionInput) -> Result<(), E5ApiError>;
        async fn timeout_payment(&self, input: &PaymentActionInput) -> Result<(), E5ApiError>;
        async fn reject_payment(&self, input: &PaymentActionInput) -> Result<(), E5ApiError>;
    }
}

mock! {
    pub Notifier {}
    impl NotificationSender for Notifier {
        async fn send_payment_confirmation(&self, resource: &PayableResource, payment: &PaymentInformation) -> Result<(), NotificationError>;
    }
}

mock! {
    pub Provider {}
    impl PaymentProvider for Provider {
        async fn get_payment_information(&self, payment_id: &str) -> Result<PaymentInformation, PaymentProviderError>;
    }
}
