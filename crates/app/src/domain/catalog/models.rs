//! Catalog Models

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Hotel UUID
pub type HotelUuid = TypedUuid<Hotel>;

/// Room Type UUID
pub type RoomTypeUuid = TypedUuid<RoomType>;

/// Room UUID
pub type RoomUuid = TypedUuid<Room>;

/// Hotel Model
#[derive(Debug, Clone)]
pub struct Hotel {
    /// Unique hotel identifier.
    pub uuid: HotelUuid,

    /// Display name.
    pub name: String,

    /// Whether the hotel currently accepts bookings.
    pub is_active: bool,

    /// Creation timestamp.
    pub created_at: Timestamp,

    /// Last update timestamp.
    pub updated_at: Timestamp,

    /// Soft-delete timestamp when deleted.
    pub deleted_at: Option<Timestamp>,
}

/// New Hotel Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewHotel {
    /// UUID to assign to the hotel row.
    pub uuid: HotelUuid,

    /// Display name.
    pub name: String,

    /// Whether the hotel accepts bookings from the start.
    pub is_active: bool,
}

/// Room Type Model
///
/// Carries the nightly rate and occupancy limit shared by every room of
/// this type.
#[derive(Debug, Clone)]
pub struct RoomType {
    /// Unique room type identifier.
    pub uuid: RoomTypeUuid,

    /// Hotel this type belongs to.
    pub hotel_uuid: HotelUuid,

    /// Display name, e.g. "Double Deluxe".
    pub name: String,

    /// Nightly rate in minor currency units.
    pub base_price: u64,

    /// Maximum number of guests a room of this type sleeps.
    pub max_occupancy: u16,

    /// Creation timestamp.
    pub created_at: Timestamp,

    /// Last update timestamp.
    pub updated_at: Timestamp,

    /// Soft-delete timestamp when deleted.
    pub deleted_at: Option<Timestamp>,
}

/// New Room Type Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewRoomType {
    /// UUID to assign to the room type row.
    pub uuid: RoomTypeUuid,

    /// Hotel this type belongs to.
    pub hotel_uuid: HotelUuid,

    /// Display name.
    pub name: String,

    /// Nightly rate in minor currency units.
    pub base_price: u64,

    /// Maximum number of guests.
    pub max_occupancy: u16,
}

/// Room Model
#[derive(Debug, Clone)]
pub struct Room {
    /// Unique room identifier.
    pub uuid: RoomUuid,

    /// Hotel this room belongs to.
    pub hotel_uuid: HotelUuid,

    /// Room type carrying rate and occupancy.
    pub room_type_uuid: RoomTypeUuid,

    /// Door number, unique within the hotel.
    pub room_number: String,

    /// Cached flag: `false` while any live booking holds this room.
    /// Date-range availability always comes from the booking ledger,
    /// never from this flag.
    pub is_available: bool,

    /// Creation timestamp.
    pub created_at: Timestamp,

    /// Last update timestamp.
    pub updated_at: Timestamp,

    /// Soft-delete timestamp when deleted.
    pub deleted_at: Option<Timestamp>,
}

/// New Room Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewRoom {
    /// UUID to assign to the room row.
    pub uuid: RoomUuid,

    /// Hotel this room belongs to.
    pub hotel_uuid: HotelUuid,

    /// Room type carrying rate and occupancy.
    pub room_type_uuid: RoomTypeUuid,

    /// Door number, unique within the hotel.
    pub room_number: String,
}
