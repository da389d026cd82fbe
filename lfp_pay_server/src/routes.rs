//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution.
//!
//! ## Routes
//! * `GET /healthcheck`
//! * `GET /healthcheck/finance-system`
//! * `GET /company/{company_number}/penalties/late-filing`
//! * `POST /company/{company_number}/penalties/late-filing/payable`
//! * `GET /company/{company_number}/penalties/late-filing/payable/{payable_id}`
//! * `GET /company/{company_number}/penalties/late-filing/payable/{payable_id}/payment`
//! * `PATCH /company/{company_number}/penalties/late-filing/payable/{payable_id}/payment`
//! * `POST /company/{company_number}/penalties/late-filing/payable/{payable_id}/e5/{timeout|reject}`
use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use e5_client::PaymentAction;
use lfp_pay_engine::{
    db_types::PayableResource,
    traits::{FinanceLedger, NotificationSender, PayableResourceManagement, PaymentProvider},
    PayableResourceApi,
    PenaltiesApi,
    SettlementApi,
};
use log::*;

use crate::{
    auth::AuthUser,
    data_objects::{
        CompanyPath,
        CreatePayableRequest,
        CreatedPayableResponse,
        HealthResponse,
        LedgerActionPath,
        PatchPaymentRequest,
        PayablePath,
        PayableResourceResponse,
    },
    errors::ServerError,
    maintenance::{FinanceSystemStatus, MaintenanceConfig},
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/healthcheck")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().finish()
}

/// Reports whether E5 is available, or in a maintenance window.
#[get("/healthcheck/finance-system")]
pub async fn finance_health(maintenance: web::Data<MaintenanceConfig>) -> HttpResponse {
    trace!("💻️ Received finance system health check request");
    match maintenance.status_at(Utc::now()) {
        Ok(FinanceSystemStatus::Healthy) => HttpResponse::Ok().json(HealthResponse::healthy()),
        Ok(FinanceSystemStatus::Maintenance(until)) => {
            HttpResponse::ServiceUnavailable().json(HealthResponse::maintenance(until))
        },
        Err(e) => {
            error!("💻️ Could not work out the E5 maintenance window. {e}");
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "message": "failed to get maintenance times from config" }))
        },
    }
}

//----------------------------------------------   Penalties  ----------------------------------------------------
route!(penalties => Get "/company/{company_number}/penalties/late-filing" impl FinanceLedger);
/// Lists every E5 transaction for the company, marking the ones that are payable penalties.
pub async fn penalties<L: FinanceLedger>(
    user: AuthUser,
    path: web::Path<CompanyPath>,
    api: web::Data<PenaltiesApi<L>>,
) -> Result<HttpResponse, ServerError> {
    let company_number = path.into_inner().company_number;
    debug!("💻️ {} requested the penalties for {company_number}", user.id);
    let penalties = api.get_penalties(company_number.as_str()).await?;
    Ok(HttpResponse::Ok().json(penalties))
}

//----------------------------------------------   Payable resources  --------------------------------------------
route!(create_payable => Post "/company/{company_number}/penalties/late-filing/payable" impl FinanceLedger, PayableResourceManagement);
/// Creates a payable resource for penalties that the caller wants to pay.
///
/// The claimed transactions are checked against E5 first. The stored transactions carry E5's type, made-up date and
/// flags, not the caller's.
pub async fn create_payable<L, B>(
    user: AuthUser,
    path: web::Path<CompanyPath>,
    body: web::Json<CreatePayableRequest>,
    penalties_api: web::Data<PenaltiesApi<L>>,
    resource_api: web::Data<PayableResourceApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    L: FinanceLedger,
    B: PayableResourceManagement,
{
    user.require_oauth2()?;
    let company_number = path.into_inner().company_number;
    let request = body.into_inner();
    request.validate()?;
    debug!("💻️ {} wants to pay {} transaction(s) for {company_number}", user.id, request.transactions.len());
    let transactions = penalties_api.transactions_are_payable(company_number.as_str(), &request.transactions).await?;
    let resource = resource_api.create(company_number.as_str(), user.created_by(), transactions).await?;
    Ok(HttpResponse::Created().json(CreatedPayableResponse::from(&resource)))
}

route!(get_payable => Get "/company/{company_number}/penalties/late-filing/payable/{payable_id}" impl PayableResourceManagement);
pub async fn get_payable<B: PayableResourceManagement>(
    user: AuthUser,
    path: web::Path<PayablePath>,
    api: web::Data<PayableResourceApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let resource = load_authorised_resource(&user, &path, &api, true).await?;
    Ok(HttpResponse::Ok().json(PayableResourceResponse::from(resource)))
}

route!(payment_details => Get "/company/{company_number}/penalties/late-filing/payable/{payable_id}/payment" impl PayableResourceManagement);
/// The view of the payable resource that the payment service uses to start a payment session.
pub async fn payment_details<B: PayableResourceManagement>(
    user: AuthUser,
    path: web::Path<PayablePath>,
    api: web::Data<PayableResourceApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let resource = load_authorised_resource(&user, &path, &api, true).await?;
    let details = PayableResourceApi::<B>::payment_details_for(&resource)?;
    Ok(HttpResponse::Ok().json(details))
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(mark_as_paid => Patch "/company/{company_number}/penalties/late-filing/payable/{payable_id}/payment" impl PayableResourceManagement, FinanceLedger, NotificationSender, PaymentProvider);
/// Called by the payment service once a payment session is complete.
///
/// The payment is looked up with the provider and checked against the resource before it is settled. Settlement marks
/// the resource as paid, replays the payment into E5 and sends the confirmation e-mail.
pub async fn mark_as_paid<B, L, N, P>(
    user: AuthUser,
    path: web::Path<PayablePath>,
    body: web::Json<PatchPaymentRequest>,
    resource_api: web::Data<PayableResourceApi<B>>,
    settlement_api: web::Data<SettlementApi<B, L, N>>,
    provider: web::Data<P>,
) -> Result<HttpResponse, ServerError>
where
    B: PayableResourceManagement,
    L: FinanceLedger,
    N: NotificationSender,
    P: PaymentProvider,
{
    user.require_elevated_privileges()?;
    let resource = load_authorised_resource(&user, &path, &resource_api, false).await?;
    let PatchPaymentRequest { reference } = body.into_inner();
    if reference.trim().is_empty() {
        return Err(ServerError::InvalidRequestBody("A payment reference is required".into()));
    }
    info!("💻️ Processing payment {reference} for payable resource {}", resource.reference);
    let payment = provider.get_payment_information(&reference).await?;
    let paid = settlement_api.settle_payment(&resource.company_number, &resource.reference, &payment).await?;
    info!("💻️ Payable resource {} for {} has been paid", paid.reference, paid.company_number);
    Ok(HttpResponse::NoContent().finish())
}

route!(unlock_ledger_account => Post "/company/{company_number}/penalties/late-filing/payable/{payable_id}/e5/{action}" impl PayableResourceManagement, FinanceLedger, NotificationSender);
/// Manually times out or rejects the E5 payment session for a resource, which unlocks the company's E5 account after
/// a failed settlement.
pub async fn unlock_ledger_account<B, L, N>(
    user: AuthUser,
    path: web::Path<LedgerActionPath>,
    resource_api: web::Data<PayableResourceApi<B>>,
    settlement_api: web::Data<SettlementApi<B, L, N>>,
) -> Result<HttpResponse, ServerError>
where
    B: PayableResourceManagement,
    L: FinanceLedger,
    N: NotificationSender,
{
    user.require_elevated_privileges()?;
    let LedgerActionPath { company_number, payable_id, action } = path.into_inner();
    let action = action.parse::<PaymentAction>().map_err(ServerError::InvalidRequestBody)?;
    let resource = resource_api
        .get_payable_resource(company_number.as_str(), &payable_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Payable resource {payable_id} does not exist")))?;
    warn!("💻️ {} is sending {action} to E5 for payable resource {payable_id}", user.id);
    settlement_api.unlock_ledger_account(&resource, action).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Fetches the payable resource named in the path and checks that the caller may see it (`is_read`) or change it.
async fn load_authorised_resource<B: PayableResourceManagement>(
    user: &AuthUser,
    path: &PayablePath,
    api: &PayableResourceApi<B>,
    is_read: bool,
) -> Result<PayableResource, ServerError> {
    let resource = api
        .get_payable_resource(path.company_number.as_str(), &path.payable_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Payable resource {} does not exist", path.payable_id)))?;
    user.check_payable_access(&resource, is_read)?;
    Ok(resource)
}
