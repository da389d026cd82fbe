use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use e5_client::E5Client;
use lfp_pay_engine::{
    events::EventNotifier,
    lfp_api::penalty_types::PenaltyTypes,
    PayableResourceApi,
    PenaltiesApi,
    SettlementApi,
    SqliteDatabase,
};
use log::*;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::{
        email::{create_email_event_handlers, EmailNotifier},
        payments::PaymentsApiClient,
    },
    routes::{
        finance_health,
        health,
        CreatePayableRoute,
        GetPayableRoute,
        MarkAsPaidRoute,
        PaymentDetailsRoute,
        PenaltiesRoute,
        UnlockLedgerAccountRoute,
    },
};

const MAX_DB_CONNECTIONS: u32 = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, MAX_DB_CONNECTIONS)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = create_email_event_handlers();
    let events = EventNotifier::new(handlers.producers(), &config.chs_url);
    let notifier = EmailNotifier::new(config.email_send_url.clone(), events);
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, notifier)?;
    srv.await?;
    Ok(())
}

/// Builds the HTTP server. Every collaborator that can fail to initialise is created up front, so that a bad
/// configuration stops the server before it binds to its port.
pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    notifier: EmailNotifier,
) -> Result<Server, ServerError> {
    let penalty_types = match &config.penalty_types_path {
        Some(path) => PenaltyTypes::from_file(path).map_err(|e| ServerError::ConfigurationError(e.to_string()))?,
        None => PenaltyTypes::default(),
    };
    let ledger = E5Client::new(config.e5.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let payments =
        PaymentsApiClient::new(&config.payments).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("💻️ Payable resources will be settled with {} ordering", config.settlement_ordering);
    let maintenance = web::Data::new(config.maintenance.clone());
    let payments = web::Data::new(payments);
    let company_code = config.company_code.clone();
    let ordering = config.settlement_ordering;
    let srv = HttpServer::new(move || {
        let penalties_api = PenaltiesApi::new(ledger.clone(), penalty_types.clone(), &company_code);
        let resource_api = PayableResourceApi::new(db.clone());
        let settlement_api = SettlementApi::new(db.clone(), ledger.clone(), notifier.clone(), &company_code)
            .with_ordering(ordering);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("lfp::access_log"))
            .app_data(web::Data::new(penalties_api))
            .app_data(web::Data::new(resource_api))
            .app_data(web::Data::new(settlement_api))
            .app_data(payments.clone())
            .app_data(maintenance.clone())
            .service(health)
            .service(finance_health)
            .service(PenaltiesRoute::<E5Client>::new())
            .service(CreatePayableRoute::<E5Client, SqliteDatabase>::new())
            .service(GetPayableRoute::<SqliteDatabase>::new())
            .service(PaymentDetailsRoute::<SqliteDatabase>::new())
            .service(MarkAsPaidRoute::<SqliteDatabase, E5Client, EmailNotifier, PaymentsApiClient>::new())
            .service(UnlockLedgerAccountRoute::<SqliteDatabase, E5Client, EmailNotifier>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
