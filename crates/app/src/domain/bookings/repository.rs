//! Bookings Repository

use std::str::FromStr;

use jiff::Timestamp;
use jiff_sqlx::{Date as SqlxDate, Timestamp as SqlxTimestamp};
use parador::{status::BookingStatus, stay::Stay};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};

use crate::domain::bookings::models::{
    Booking, BookingFilter, BookingUuid, NewBooking, RoomForBooking,
};
use crate::domain::catalog::models::{HotelUuid, RoomUuid};

const GET_ROOM_FOR_BOOKING_SQL: &str = include_str!("sql/get_room_for_booking.sql");
const ROOM_HAS_OVERLAP_SQL: &str = include_str!("sql/room_has_overlap.sql");
const CREATE_BOOKING_SQL: &str = include_str!("sql/create_booking.sql");
const GET_BOOKING_SQL: &str = include_str!("sql/get_booking.sql");
const GET_BOOKING_FOR_UPDATE_SQL: &str = include_str!("sql/get_booking_for_update.sql");
const LIST_BOOKINGS_SQL: &str = include_str!("sql/list_bookings.sql");
const TRANSITION_BOOKING_SQL: &str = include_str!("sql/transition_booking.sql");
const REASSIGN_BOOKING_SQL: &str = include_str!("sql/reassign_booking.sql");
const SOFT_DELETE_BOOKING_SQL: &str = include_str!("sql/soft_delete_booking.sql");
const RESYNC_ROOM_AVAILABILITY_SQL: &str = include_str!("sql/resync_room_availability.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgBookingsRepository;

impl PgBookingsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Reads the room with its pricing and occupancy facts, taking a row
    /// lock on the room so concurrent writers for the same room serialize.
    pub(crate) async fn get_room_for_booking(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        room: RoomUuid,
    ) -> Result<RoomForBooking, sqlx::Error> {
        query_as::<Postgres, RoomForBooking>(GET_ROOM_FOR_BOOKING_SQL)
            .bind(room.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn room_has_overlap(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        room: RoomUuid,
        stay: Stay,
    ) -> Result<bool, sqlx::Error> {
        query_scalar::<Postgres, bool>(ROOM_HAS_OVERLAP_SQL)
            .bind(room.into_uuid())
            .bind(SqlxDate::from(stay.check_in()))
            .bind(SqlxDate::from(stay.check_out()))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_booking(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: NewBooking,
        booking_number: &str,
        stay: Stay,
        total_price_minor: i64,
    ) -> Result<Booking, sqlx::Error> {
        query_as::<Postgres, Booking>(CREATE_BOOKING_SQL)
            .bind(booking.uuid.into_uuid())
            .bind(booking_number)
            .bind(booking.user_uuid)
            .bind(booking.hotel_uuid.into_uuid())
            .bind(booking.room_uuid.into_uuid())
            .bind(SqlxDate::from(stay.check_in()))
            .bind(SqlxDate::from(stay.check_out()))
            .bind(i32::from(booking.adults))
            .bind(i32::from(booking.children))
            .bind(booking.special_requests)
            .bind(booking.source.as_str())
            .bind(total_price_minor)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_booking(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: BookingUuid,
    ) -> Result<Booking, sqlx::Error> {
        query_as::<Postgres, Booking>(GET_BOOKING_SQL)
            .bind(booking.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_booking_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: BookingUuid,
    ) -> Result<Booking, sqlx::Error> {
        query_as::<Postgres, Booking>(GET_BOOKING_FOR_UPDATE_SQL)
            .bind(booking.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_bookings(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: &BookingFilter,
    ) -> Result<Vec<Booking>, sqlx::Error> {
        query_as::<Postgres, Booking>(LIST_BOOKINGS_SQL)
            .bind(filter.user_uuid)
            .bind(filter.hotel_uuid.map(HotelUuid::into_uuid))
            .bind(filter.room_uuid.map(RoomUuid::into_uuid))
            .bind(filter.status.map(BookingStatus::as_str))
            .bind(filter.payment_status.map(|status| status.as_str()))
            .bind(filter.source.map(|source| source.as_str()))
            .fetch_all(&mut **tx)
            .await
    }

    /// Moves the booking to `target`, stamping the matching timestamp
    /// column exactly once. A target with no timestamp column, such as
    /// `no_show`, stamps nothing.
    pub(crate) async fn apply_transition(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: BookingUuid,
        target: BookingStatus,
        at: Timestamp,
    ) -> Result<Booking, sqlx::Error> {
        query_as::<Postgres, Booking>(TRANSITION_BOOKING_SQL)
            .bind(booking.into_uuid())
            .bind(target.as_str())
            .bind(SqlxTimestamp::from(at))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn reassign_booking(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: BookingUuid,
        room: RoomUuid,
    ) -> Result<Booking, sqlx::Error> {
        query_as::<Postgres, Booking>(REASSIGN_BOOKING_SQL)
            .bind(booking.into_uuid())
            .bind(room.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn soft_delete_booking(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: BookingUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(SOFT_DELETE_BOOKING_SQL)
            .bind(booking.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Recomputes the cached `is_available` flag from the booking ledger.
    /// The flag is always derived in full, never toggled.
    pub(crate) async fn resync_room_availability(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        room: RoomUuid,
    ) -> Result<(), sqlx::Error> {
        query(RESYNC_ROOM_AVAILABILITY_SQL)
            .bind(room.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for Booking {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let check_in_date = row.try_get::<SqlxDate, _>("check_in_date")?.to_jiff();
        let check_out_date = row.try_get::<SqlxDate, _>("check_out_date")?.to_jiff();

        let stay =
            Stay::from_dates(check_in_date, check_out_date).map_err(|e| sqlx::Error::ColumnDecode {
                index: "check_out_date".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: BookingUuid::from_uuid(row.try_get("uuid")?),
            booking_number: row.try_get("booking_number")?,
            user_uuid: row.try_get("user_uuid")?,
            hotel_uuid: HotelUuid::from_uuid(row.try_get("hotel_uuid")?),
            room_uuid: RoomUuid::from_uuid(row.try_get("room_uuid")?),
            stay,
            adults: try_get_occupancy(row, "adults")?,
            children: try_get_occupancy(row, "children")?,
            special_requests: row.try_get("special_requests")?,
            status: try_get_parsed(row, "status")?,
            payment_status: try_get_parsed(row, "payment_status")?,
            source: try_get_parsed(row, "source")?,
            total_price: try_get_amount(row, "total_price")?,
            paid_amount: try_get_amount(row, "paid_amount")?,
            confirmed_at: row
                .try_get::<Option<SqlxTimestamp>, _>("confirmed_at")?
                .map(SqlxTimestamp::to_jiff),
            checked_in_at: row
                .try_get::<Option<SqlxTimestamp>, _>("checked_in_at")?
                .map(SqlxTimestamp::to_jiff),
            checked_out_at: row
                .try_get::<Option<SqlxTimestamp>, _>("checked_out_at")?
                .map(SqlxTimestamp::to_jiff),
            cancelled_at: row
                .try_get::<Option<SqlxTimestamp>, _>("cancelled_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for RoomForBooking {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            room_uuid: RoomUuid::from_uuid(row.try_get("room_uuid")?),
            hotel_uuid: HotelUuid::from_uuid(row.try_get("hotel_uuid")?),
            hotel_active: row.try_get("hotel_active")?,
            base_price: try_get_amount(row, "base_price")?,
            max_occupancy: try_get_occupancy(row, "max_occupancy")?,
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

pub(super) fn try_get_occupancy(row: &PgRow, col: &str) -> Result<u16, sqlx::Error> {
    let occupancy_i32: i32 = row.try_get(col)?;

    u16::try_from(occupancy_i32).map_err(|e| sqlx::Error::ColumnDecode {
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
