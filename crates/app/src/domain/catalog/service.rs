//! Catalog service.

use async_trait::async_trait;
use jiff::civil::Date;
use mockall::automock;
use parador::stay::Stay;

use crate::{
    database::Db,
    domain::{
        catalog::{
            errors::CatalogServiceError,
            models::{Hotel, HotelUuid, NewHotel, NewRoom, NewRoomType, Room, RoomType, RoomUuid},
            repository::PgCatalogRepository,
        },
        tenants::records::TenantUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgCatalogService {
    db: Db,
    repository: PgCatalogRepository,
}

impl PgCatalogService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCatalogRepository::new(),
        }
    }
}

#[async_trait]
impl CatalogService for PgCatalogService {
    async fn create_hotel(
        &self,
        tenant: TenantUuid,
        hotel: NewHotel,
    ) -> Result<Hotel, CatalogServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let created = self.repository.create_hotel(&mut tx, hotel).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn get_hotel(
        &self,
        tenant: TenantUuid,
        uuid: HotelUuid,
    ) -> Result<Hotel, CatalogServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let hotel = self.repository.get_hotel(&mut tx, uuid).await?;

        tx.commit().await?;

        Ok(hotel)
    }

    async fn create_room_type(
        &self,
        tenant: TenantUuid,
        room_type: NewRoomType,
    ) -> Result<RoomType, CatalogServiceError> {
        let base_price_minor = i64::try_from(room_type.base_price)?;

        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let created = self
            .repository
            .create_room_type(&mut tx, room_type, base_price_minor)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn create_room(
        &self,
        tenant: TenantUuid,
        room: NewRoom,
    ) -> Result<Room, CatalogServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let room_type = self
            .repository
            .get_room_type(&mut tx, room.room_type_uuid)
            .await?;

        if room_type.hotel_uuid != room.hotel_uuid {
            return Err(CatalogServiceError::RoomTypeNotInHotel);
        }

        let created = self.repository.create_room(&mut tx, room).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn get_room(
        &self,
        tenant: TenantUuid,
        uuid: RoomUuid,
    ) -> Result<Room, CatalogServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let room = self.repository.get_room(&mut tx, uuid).await?;

        tx.commit().await?;

        Ok(room)
    }

    async fn list_available_rooms(
        &self,
        tenant: TenantUuid,
        hotel: HotelUuid,
        check_in_date: Date,
        check_out_date: Date,
    ) -> Result<Vec<Room>, CatalogServiceError> {
        let stay = Stay::from_dates(check_in_date, check_out_date)?;

        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        self.repository.get_hotel(&mut tx, hotel).await?;

        let rooms = self
            .repository
            .list_available_rooms(&mut tx, hotel, stay)
            .await?;

        tx.commit().await?;

        Ok(rooms)
    }
}

#[automock]
#[async_trait]
/// Hotel inventory operations.
pub trait CatalogService: Send + Sync {
    /// Creates a new hotel.
    async fn create_hotel(
        &self,
        tenant: TenantUuid,
        hotel: NewHotel,
    ) -> Result<Hotel, CatalogServiceError>;

    /// Retrieves a single hotel.
    async fn get_hotel(
        &self,
        tenant: TenantUuid,
        uuid: HotelUuid,
    ) -> Result<Hotel, CatalogServiceError>;

    /// Creates a new room type under a hotel.
    async fn create_room_type(
        &self,
        tenant: TenantUuid,
        room_type: NewRoomType,
    ) -> Result<RoomType, CatalogServiceError>;

    /// Creates a new room. The room type must belong to the same hotel.
    async fn create_room(
        &self,
        tenant: TenantUuid,
        room: NewRoom,
    ) -> Result<Room, CatalogServiceError>;

    /// Retrieves a single room.
    async fn get_room(&self, tenant: TenantUuid, uuid: RoomUuid)
    -> Result<Room, CatalogServiceError>;

    /// Lists the rooms of a hotel with no live booking overlapping the
    /// half-open `[check_in_date, check_out_date)` range.
    async fn list_available_rooms(
        &self,
        tenant: TenantUuid,
        hotel: HotelUuid,
        check_in_date: Date,
        check_out_date: Date,
    ) -> Result<Vec<Room>, CatalogServiceError>;
}
