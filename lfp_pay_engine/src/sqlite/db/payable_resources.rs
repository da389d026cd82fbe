use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use e5_client::PaymentAction;
use lfp_common::Pence;
use log::{debug, trace};
use sqlx::{types::Json, FromRow, SqliteConnection};

use crate::{
    db_types::{CreatedBy, NewPayableResource, PayableResource, Payment, PaymentStatus, TransactionItem},
    helpers::generate_etag,
    traits::{PayableStoreError, PaymentUpdateResult, SettlementClaim},
};

#[derive(Debug, FromRow)]
struct PayableResourceRow {
    id: i64,
    company_number: String,
    reference: String,
    etag: String,
    transactions: Json<BTreeMap<String, TransactionItem>>,
    payment_status: String,
    payment_amount: Option<Pence>,
    payment_reference: Option<String>,
    paid_at: Option<DateTime<Utc>>,
    created_by_id: String,
    created_by_email: String,
    created_by_forename: String,
    created_by_surname: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    e5_command_error: Option<String>,
    e5_payment_id: Option<String>,
}

impl TryFrom<PayableResourceRow> for PayableResource {
    type Error = PayableStoreError;

    fn try_from(row: PayableResourceRow) -> Result<Self, Self::Error> {
        let e5_command_error = row
            .e5_command_error
            .map(|s| s.parse::<PaymentAction>())
            .transpose()
            .map_err(|e| PayableStoreError::CorruptRecord(format!("{}: {e}", row.reference)))?;
        Ok(Self {
            id: row.id,
            company_number: row.company_number,
            reference: row.reference,
            etag: row.etag,
            transactions: row.transactions.0,
            payment: Payment {
                status: PaymentStatus::from(row.payment_status),
                amount: row.payment_amount,
                reference: row.payment_reference,
                paid_at: row.paid_at,
            },
            created_by: CreatedBy {
                id: row.created_by_id,
                email: row.created_by_email,
                forename: row.created_by_forename,
                surname: row.created_by_surname,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
            e5_command_error,
            e5_payment_id: row.e5_payment_id,
        })
    }
}

/// Inserts a new payable resource using the given connection. This is not atomic. You can embed this call inside a
/// transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
pub async fn insert_payable_resource(
    resource: NewPayableResource,
    conn: &mut SqliteConnection,
) -> Result<PayableResource, PayableStoreError> {
    let transactions = Json(resource.transaction_map());
    let row: PayableResourceRow = sqlx::query_as(
        r#"
            INSERT INTO payable_resources (
                company_number,
                reference,
                etag,
                transactions,
                payment_status,
                created_by_id,
                created_by_email,
                created_by_forename,
                created_by_surname
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *;
        "#,
    )
    .bind(resource.company_number)
    .bind(resource.reference)
    .bind(generate_etag())
    .bind(transactions)
    .bind(PaymentStatus::Pending.as_str())
    .bind(resource.created_by.id)
    .bind(resource.created_by.email)
    .bind(resource.created_by.forename)
    .bind(resource.created_by.surname)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Payable resource [{}/{}] inserted with id {}", row.company_number, row.reference, row.id);
    PayableResource::try_from(row)
}

pub async fn fetch_payable_resource(
    company_number: &str,
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<PayableResource>, PayableStoreError> {
    let row: Option<PayableResourceRow> =
        sqlx::query_as("SELECT * FROM payable_resources WHERE company_number = $1 AND reference = $2")
            .bind(company_number)
            .bind(reference)
            .fetch_optional(conn)
            .await?;
    row.map(PayableResource::try_from).transpose()
}

/// Sets the payment details on the resource unless it is already paid. The guard lives in the `WHERE` clause, so the
/// check and the write cannot be interleaved with another writer.
pub async fn update_payment_details(
    company_number: &str,
    reference: &str,
    payment: &Payment,
    conn: &mut SqliteConnection,
) -> Result<PaymentUpdateResult, PayableStoreError> {
    let row: Option<PayableResourceRow> = sqlx::query_as(
        r#"
            UPDATE payable_resources SET
                payment_status = $1,
                payment_amount = $2,
                payment_reference = $3,
                paid_at = $4,
                etag = $5,
                updated_at = CURRENT_TIMESTAMP
            WHERE company_number = $6 AND reference = $7 AND payment_status != 'paid'
            RETURNING *;
        "#,
    )
    .bind(payment.status.as_str())
    .bind(payment.amount)
    .bind(payment.reference.as_deref())
    .bind(payment.paid_at)
    .bind(generate_etag())
    .bind(company_number)
    .bind(reference)
    .fetch_optional(&mut *conn)
    .await?;
    match row {
        Some(row) => {
            trace!("📝️ Payment details for [{company_number}/{reference}] updated");
            Ok(PaymentUpdateResult::Updated(PayableResource::try_from(row)?))
        },
        None => match fetch_payable_resource(company_number, reference, conn).await? {
            Some(_) => Ok(PaymentUpdateResult::AlreadyPaid),
            None => Ok(PaymentUpdateResult::NotFound),
        },
    }
}

/// Claims an unpaid resource for settlement by storing the E5 payment id against it. Only a resource without a claim
/// can be claimed.
pub async fn claim_for_settlement(
    company_number: &str,
    reference: &str,
    e5_payment_id: &str,
    conn: &mut SqliteConnection,
) -> Result<SettlementClaim, PayableStoreError> {
    let row: Option<PayableResourceRow> = sqlx::query_as(
        r#"
            UPDATE payable_resources SET
                e5_payment_id = $1,
                etag = $2,
                updated_at = CURRENT_TIMESTAMP
            WHERE company_number = $3 AND reference = $4 AND payment_status != 'paid' AND e5_payment_id IS NULL
            RETURNING *;
        "#,
    )
    .bind(e5_payment_id)
    .bind(generate_etag())
    .bind(company_number)
    .bind(reference)
    .fetch_optional(&mut *conn)
    .await?;
    if let Some(row) = row {
        trace!("📝️ [{company_number}/{reference}] claimed for E5 payment {e5_payment_id}");
        return Ok(SettlementClaim::Claimed(PayableResource::try_from(row)?));
    }
    match fetch_payable_resource(company_number, reference, conn).await? {
        None => Ok(SettlementClaim::NotFound),
        Some(resource) if resource.is_paid() => Ok(SettlementClaim::AlreadyPaid),
        Some(resource) => Ok(SettlementClaim::AlreadyClaimed(resource.e5_payment_id.unwrap_or_default())),
    }
}

pub async fn release_settlement_claim(
    company_number: &str,
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<bool, PayableStoreError> {
    let result = sqlx::query(
        r#"
            UPDATE payable_resources SET
                e5_payment_id = NULL,
                etag = $1,
                updated_at = CURRENT_TIMESTAMP
            WHERE company_number = $2 AND reference = $3 AND payment_status != 'paid' AND e5_payment_id IS NOT NULL
        "#,
    )
    .bind(generate_etag())
    .bind(company_number)
    .bind(reference)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn save_e5_error(
    company_number: &str,
    reference: &str,
    action: PaymentAction,
    conn: &mut SqliteConnection,
) -> Result<(), PayableStoreError> {
    let result = sqlx::query(
        r#"
            UPDATE payable_resources SET
                e5_command_error = $1,
                etag = $2,
                updated_at = CURRENT_TIMESTAMP
            WHERE company_number = $3 AND reference = $4
        "#,
    )
    .bind(action.as_str())
    .bind(generate_etag())
    .bind(company_number)
    .bind(reference)
    .execute(conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(PayableStoreError::NotFound(format!("{company_number}/{reference}")));
    }
    Ok(())
}
