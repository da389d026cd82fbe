//! `SqliteDatabase` is the concrete storage backend for payable resources.
//!
//! It implements [`PayableResourceManagement`] on top of a SQLite connection pool.
use std::fmt::Debug;

use e5_client::PaymentAction;
use log::*;
use sqlx::SqlitePool;

use super::db::{db_url, new_pool, payable_resources};
use crate::{
    db_types::{NewPayableResource, PayableResource, Payment},
    traits::{PayableResourceManagement, PayableStoreError, PaymentUpdateResult, SettlementClaim},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl PayableResourceManagement for SqliteDatabase {
    async fn insert_payable_resource(
        &self,
        resource: NewPayableResource,
    ) -> Result<PayableResource, PayableStoreError> {
        let mut conn = self.pool.acquire().await?;
        payable_resources::insert_payable_resource(resource, &mut conn).await
    }

    async fn fetch_payable_resource(
        &self,
        company_number: &str,
        reference: &str,
    ) -> Result<Option<PayableResource>, PayableStoreError> {
        let mut conn = self.pool.acquire().await?;
        payable_resources::fetch_payable_resource(company_number, reference, &mut conn).await
    }

    async fn update_payment_details(
        &self,
        company_number: &str,
        reference: &str,
        payment: &Payment,
    ) -> Result<PaymentUpdateResult, PayableStoreError> {
        let mut tx = self.pool.begin().await?;
        let result = payable_resources::update_payment_details(company_number, reference, payment, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn claim_for_settlement(
        &self,
        company_number: &str,
        reference: &str,
        e5_payment_id: &str,
    ) -> Result<SettlementClaim, PayableStoreError> {
        let mut tx = self.pool.begin().await?;
        let claim = payable_resources::claim_for_settlement(company_number, reference, e5_payment_id, &mut tx).await?;
        tx.commit().await?;
        Ok(claim)
    }

    async fn release_settlement_claim(
        &self,
        company_number: &str,
        reference: &str,
    ) -> Result<bool, PayableStoreError> {
        let mut conn = self.pool.acquire().await?;
        payable_resources::release_settlement_claim(company_number, reference, &mut conn).await
    }

    async fn save_e5_error(
        &self,
        company_number: &str,
        reference: &str,
        action: PaymentAction,
    ) -> Result<(), PayableStoreError> {
        let mut conn = self.pool.acquire().await?;
        payable_resources::save_e5_error(company_number, reference, action, &mut conn).await
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }
}
