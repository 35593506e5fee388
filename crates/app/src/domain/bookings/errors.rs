//! Bookings service errors.

use std::num::TryFromIntError;

use parador::{pricing::PriceOverflowError, stay::InvalidStayError, transition::TransitionError};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

/// SQLSTATEs surfaced when two writers collide: exclusion violation,
/// serialization failure and deadlock. All three mean the operation lost a
/// race and may be retried as a whole.
const CONFLICT_SQLSTATES: [&str; 3] = ["23P01", "40001", "40P01"];

#[derive(Debug, Error)]
pub enum BookingsServiceError {
    #[error("room is not available for the requested dates")]
    RoomUnavailable,

    #[error("invalid stay dates")]
    InvalidStay(#[from] InvalidStayError),

    #[error("invalid status change")]
    InvalidTransition(#[from] TransitionError),

    #[error("a booking needs at least one adult")]
    NoAdults,

    #[error("party of {requested} exceeds the room limit of {max}")]
    OccupancyExceeded {
        /// Adults plus children requested.
        requested: u32,
        /// Occupancy limit of the room's type.
        max: u32,
    },

    #[error("room does not belong to the requested hotel")]
    RoomNotInHotel,

    #[error("hotel is not accepting bookings")]
    HotelInactive,

    #[error("booking still occupies its room")]
    StillActive,

    #[error("booking no longer occupies a room")]
    NotActive,

    #[error("booking lost a concurrent update race; safe to retry")]
    ConcurrencyConflict,

    #[error("booking already exists")]
    AlreadyExists,

    #[error("booking not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),

    #[error("price calculation overflowed")]
    PriceOverflow(#[from] PriceOverflowError),

    #[error("invalid price value")]
    InvalidPrice(#[from] TryFromIntError),
}

impl From<Error> for BookingsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        if let Some(code) = error.as_database_error().and_then(DatabaseError::code) {
            if CONFLICT_SQLSTATES.contains(&code.as_ref()) {
                return Self::ConcurrencyConflict;
            }
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
