//! Payments Repository

use std::str::FromStr;

use jiff_sqlx::Timestamp as SqlxTimestamp;
use parador::status::{PaymentState, PaymentStatus};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};

use crate::domain::bookings::models::{Booking, BookingUuid};
use crate::domain::payments::models::{BookingBalance, NewPayment, Payment, PaymentUuid};

const CREATE_PAYMENT_SQL: &str = include_str!("sql/create_payment.sql");
const GET_PAYMENT_FOR_UPDATE_SQL: &str = include_str!("sql/get_payment_for_update.sql");
const FIND_PAYMENT_BY_TRANSACTION_ID_SQL: &str =
    include_str!("sql/find_payment_by_transaction_id.sql");
const LIST_PAYMENTS_SQL: &str = include_str!("sql/list_payments.sql");
const SUM_COMPLETED_PAYMENTS_SQL: &str = include_str!("sql/sum_completed_payments.sql");
const MARK_PAYMENT_REFUNDED_SQL: &str = include_str!("sql/mark_payment_refunded.sql");
const GET_BOOKING_BALANCE_SQL: &str = include_str!("sql/get_booking_balance.sql");
const GET_BOOKING_BALANCE_FOR_UPDATE_SQL: &str =
    include_str!("sql/get_booking_balance_for_update.sql");
const UPDATE_BOOKING_PAYMENT_SQL: &str = include_str!("sql/update_booking_payment.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPaymentsRepository;

impl PgPaymentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: BookingUuid,
        payment: NewPayment,
        state: PaymentState,
        amount_minor: i64,
    ) -> Result<Payment, sqlx::Error> {
        query_as::<Postgres, Payment>(CREATE_PAYMENT_SQL)
            .bind(payment.uuid.into_uuid())
            .bind(booking.into_uuid())
            .bind(amount_minor)
            .bind(payment.method.as_str())
            .bind(payment.transaction_id)
            .bind(state.as_str())
            .bind(payment.notes)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_payment_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
    ) -> Result<Payment, sqlx::Error> {
        query_as::<Postgres, Payment>(GET_PAYMENT_FOR_UPDATE_SQL)
            .bind(payment.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_payment_by_transaction_id(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        transaction_id: &str,
    ) -> Result<Option<Payment>, sqlx::Error> {
        query_as::<Postgres, Payment>(FIND_PAYMENT_BY_TRANSACTION_ID_SQL)
            .bind(transaction_id)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_payments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: BookingUuid,
    ) -> Result<Vec<Payment>, sqlx::Error> {
        query_as::<Postgres, Payment>(LIST_PAYMENTS_SQL)
            .bind(booking.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// Sums the completed rows of a booking's ledger. This is the only
    /// source the booking's `paid_amount` is ever written from.
    pub(crate) async fn sum_completed_payments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: BookingUuid,
    ) -> Result<u64, sqlx::Error> {
        let paid_total: i64 = query_scalar(SUM_COMPLETED_PAYMENTS_SQL)
            .bind(booking.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        u64::try_from(paid_total).map_err(|e| sqlx::Error::ColumnDecode {
            index: "paid_total".to_string(),
            source: Box::new(e),
        })
    }

    pub(crate) async fn mark_payment_refunded(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
    ) -> Result<Payment, sqlx::Error> {
        query_as::<Postgres, Payment>(MARK_PAYMENT_REFUNDED_SQL)
            .bind(payment.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_booking_balance(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: BookingUuid,
    ) -> Result<BookingBalance, sqlx::Error> {
        query_as::<Postgres, BookingBalance>(GET_BOOKING_BALANCE_SQL)
            .bind(booking.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Reads the booking's money facts under a row lock so concurrent
    /// ledger writers for the same booking serialize.
    pub(crate) async fn get_booking_balance_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: BookingUuid,
    ) -> Result<BookingBalance, sqlx::Error> {
        query_as::<Postgres, BookingBalance>(GET_BOOKING_BALANCE_FOR_UPDATE_SQL)
            .bind(booking.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_booking_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: BookingUuid,
        paid_minor: i64,
        status: PaymentStatus,
    ) -> Result<Booking, sqlx::Error> {
        query_as::<Postgres, Booking>(UPDATE_BOOKING_PAYMENT_SQL)
            .bind(booking.into_uuid())
            .bind(paid_minor)
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for Payment {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: PaymentUuid::from_uuid(row.try_get("uuid")?),
            booking_uuid: BookingUuid::from_uuid(row.try_get("booking_uuid")?),
            amount: try_get_amount(row, "amount")?,
            method: try_get_parsed(row, "method")?,
            transaction_id: row.try_get("transaction_id")?,
            state: try_get_parsed(row, "state")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for BookingBalance {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            booking_uuid: BookingUuid::from_uuid(row.try_get("uuid")?),
            total_price: try_get_amount(row, "total_price")?,
            paid_amount: try_get_amount(row, "paid_amount")?,
        })
    }
}

pub(super) fn try_get_amount(row: &PgRow, col: &str) -> Result<u64, sqlx::Error> {
    let amount_i64: i64 = row.try_get(col)?;

    u64::try_from(amount_i64).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

pub(super) fn try_get_parsed<T>(row: &PgRow, col: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.try_get(col)?;

    raw.parse().map_err(|e: T::Err| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}
