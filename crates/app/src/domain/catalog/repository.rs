//! Catalog Repository

use jiff_sqlx::{Date as SqlxDate, Timestamp as SqlxTimestamp};
use parador::stay::Stay;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::domain::catalog::models::{
    Hotel, HotelUuid, NewHotel, NewRoom, NewRoomType, Room, RoomType, RoomTypeUuid, RoomUuid,
};

const CREATE_HOTEL_SQL: &str = include_str!("sql/create_hotel.sql");
const GET_HOTEL_SQL: &str = include_str!("sql/get_hotel.sql");
const CREATE_ROOM_TYPE_SQL: &str = include_str!("sql/create_room_type.sql");
const GET_ROOM_TYPE_SQL: &str = include_str!("sql/get_room_type.sql");
const CREATE_ROOM_SQL: &str = include_str!("sql/create_room.sql");
const GET_ROOM_SQL: &str = include_str!("sql/get_room.sql");
const LIST_AVAILABLE_ROOMS_SQL: &str = include_str!("sql/list_available_rooms.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCatalogRepository;

impl PgCatalogRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_hotel(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        hotel: NewHotel,
    ) -> Result<Hotel, sqlx::Error> {
        query_as::<Postgres, Hotel>(CREATE_HOTEL_SQL)
            .bind(hotel.uuid.into_uuid())
            .bind(hotel.name)
            .bind(hotel.is_active)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_hotel(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        hotel: HotelUuid,
    ) -> Result<Hotel, sqlx::Error> {
        query_as::<Postgres, Hotel>(GET_HOTEL_SQL)
            .bind(hotel.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_room_type(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        room_type: NewRoomType,
        base_price_minor: i64,
    ) -> Result<RoomType, sqlx::Error> {
        query_as::<Postgres, RoomType>(CREATE_ROOM_TYPE_SQL)
            .bind(room_type.uuid.into_uuid())
            .bind(room_type.hotel_uuid.into_uuid())
            .bind(room_type.name)
            .bind(base_price_minor)
            .bind(i32::from(room_type.max_occupancy))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_room_type(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        room_type: RoomTypeUuid,
    ) -> Result<RoomType, sqlx::Error> {
        query_as::<Postgres, RoomType>(GET_ROOM_TYPE_SQL)
            .bind(room_type.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_room(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        room: NewRoom,
    ) -> Result<Room, sqlx::Error> {
        query_as::<Postgres, Room>(CREATE_ROOM_SQL)
            .bind(room.uuid.into_uuid())
            .bind(room.hotel_uuid.into_uuid())
            .bind(room.room_type_uuid.into_uuid())
            .bind(room.room_number)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_room(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        room: RoomUuid,
    ) -> Result<Room, sqlx::Error> {
        query_as::<Postgres, Room>(GET_ROOM_SQL)
            .bind(room.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_available_rooms(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        hotel: HotelUuid,
        stay: Stay,
    ) -> Result<Vec<Room>, sqlx::Error> {
        query_as::<Postgres, Room>(LIST_AVAILABLE_ROOMS_SQL)
            .bind(hotel.into_uuid())
            .bind(SqlxDate::from(stay.check_in()))
            .bind(SqlxDate::from(stay.check_out()))
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for Hotel {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: HotelUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for RoomType {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: RoomTypeUuid::from_uuid(row.try_get("uuid")?),
            hotel_uuid: HotelUuid::from_uuid(row.try_get("hotel_uuid")?),
            name: row.try_get("name")?,
            base_price: try_get_amount(row, "base_price")?,
            max_occupancy: try_get_occupancy(row, "max_occupancy")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for Room {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: RoomUuid::from_uuid(row.try_get("uuid")?),
            hotel_uuid: HotelUuid::from_uuid(row.try_get("hotel_uuid")?),
            room_type_uuid: RoomTypeUuid::from_uuid(row.try_get("room_type_uuid")?),
            room_number: row.try_get("room_number")?,
            is_available: row.try_get("is_available")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
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
