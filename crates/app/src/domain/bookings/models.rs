//! Booking Models

use jiff::Timestamp;
use jiff::civil::Date;
use parador::{
    reconcile,
    status::{BookingSource, BookingStatus, PaymentStatus},
    stay::{self, Stay},
};
use uuid::Uuid;

use crate::domain::catalog::models::{HotelUuid, RoomUuid};
use crate::uuids::TypedUuid;

/// Booking UUID
pub type BookingUuid = TypedUuid<Booking>;

/// Booking Model
#[derive(Debug, Clone)]
pub struct Booking {
    /// Unique booking identifier.
    pub uuid: BookingUuid,

    /// Human-facing reference, e.g. `BK20250514-7GK2QD`.
    pub booking_number: String,

    /// Guest identifier issued by the surrounding identity system.
    pub user_uuid: Uuid,

    /// Hotel the stay takes place in.
    pub hotel_uuid: HotelUuid,

    /// Room currently assigned to the stay.
    pub room_uuid: RoomUuid,

    /// Booked date range, half-open on the check-out day.
    pub stay: Stay,

    /// Number of adults in the party.
    pub adults: u16,

    /// Number of children in the party.
    pub children: u16,

    /// Free-text wishes passed to the front desk.
    pub special_requests: Option<String>,

    /// Position in the lifecycle.
    pub status: BookingStatus,

    /// Derived payment position, kept in sync with the payment ledger.
    pub payment_status: PaymentStatus,

    /// Channel the booking arrived through.
    pub source: BookingSource,

    /// Price for the whole stay in minor currency units.
    pub total_price: u64,

    /// Sum of completed payments in minor currency units.
    pub paid_amount: u64,

    /// When the booking was confirmed, if it ever was.
    pub confirmed_at: Option<Timestamp>,

    /// When the guest checked in, if they ever did.
    pub checked_in_at: Option<Timestamp>,

    /// When the guest checked out, if they ever did.
    pub checked_out_at: Option<Timestamp>,

    /// When the booking was cancelled, if it ever was.
    pub cancelled_at: Option<Timestamp>,

    /// Creation timestamp.
    pub created_at: Timestamp,

    /// Last update timestamp.
    pub updated_at: Timestamp,

    /// Soft-delete timestamp when deleted.
    pub deleted_at: Option<Timestamp>,
}

impl Booking {
    /// Remaining amount owed in minor currency units.
    #[must_use]
    pub fn balance_due(&self) -> u64 {
        reconcile::balance_due(self.total_price, self.paid_amount)
    }

    /// Number of nights booked.
    #[must_use]
    pub fn nights(&self) -> u32 {
        self.stay.nights()
    }

    /// Whether the stay is still ahead of `today`.
    #[must_use]
    pub fn is_upcoming(&self, today: Date) -> bool {
        stay::is_upcoming(self.stay, self.status, today)
    }

    /// Whether the guest is in house on `today`.
    #[must_use]
    pub fn is_active(&self, today: Date) -> bool {
        stay::is_active(self.stay, self.status, today)
    }
}

/// New Booking Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    /// UUID to assign to the booking row.
    pub uuid: BookingUuid,

    /// Guest identifier issued by the surrounding identity system.
    pub user_uuid: Uuid,

    /// Hotel the stay takes place in.
    pub hotel_uuid: HotelUuid,

    /// Room to book.
    pub room_uuid: RoomUuid,

    /// First night of the stay.
    pub check_in_date: Date,

    /// Departure day; not a night of the stay.
    pub check_out_date: Date,

    /// Number of adults in the party.
    pub adults: u16,

    /// Number of children in the party.
    pub children: u16,

    /// Free-text wishes passed to the front desk.
    pub special_requests: Option<String>,

    /// Channel the booking arrived through.
    pub source: BookingSource,
}

/// Filters for booking listings. Unset fields match everything; set fields
/// combine with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingFilter {
    /// Limit to one guest.
    pub user_uuid: Option<Uuid>,

    /// Limit to one hotel.
    pub hotel_uuid: Option<HotelUuid>,

    /// Limit to one room.
    pub room_uuid: Option<RoomUuid>,

    /// Limit to one lifecycle position.
    pub status: Option<BookingStatus>,

    /// Limit to one payment position.
    pub payment_status: Option<PaymentStatus>,

    /// Limit to one arrival channel.
    pub source: Option<BookingSource>,
}

/// Room joined with the pricing and occupancy facts needed to take a
/// booking, read under a row lock.
#[derive(Debug, Clone)]
pub(crate) struct RoomForBooking {
    pub room_uuid: RoomUuid,
    pub hotel_uuid: HotelUuid,
    pub hotel_active: bool,
    pub base_price: u64,
    pub max_occupancy: u16,
}
