//! Bookings service.
//!
//! Every operation runs inside one tenant-scoped transaction. Writers that
//! touch a room's calendar first take a row lock on the room, so the
//! ledger check and the insert happen atomically; the exclusion constraint
//! on the bookings table backstops anything that slips past.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::{Timestamp, Zoned};
use mockall::automock;
use parador::{
    pricing,
    stay::{BookingPolicy, Stay},
    transition::Transition,
};
use sqlx::error::DatabaseError;
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        bookings::{
            errors::BookingsServiceError,
            models::{Booking, BookingFilter, BookingUuid, NewBooking},
            number,
            repository::PgBookingsRepository,
        },
        catalog::models::RoomUuid,
        tenants::records::TenantUuid,
    },
    notifications::Notifier,
};

/// How many booking references to draw before treating reference
/// collisions as a hard failure.
const MAX_BOOKING_NUMBER_ATTEMPTS: u32 = 3;

#[derive(Clone)]
pub struct PgBookingsService {
    db: Db,
    repository: PgBookingsRepository,
    policy: BookingPolicy,
    notifier: Arc<dyn Notifier>,
}

impl PgBookingsService {
    #[must_use]
    pub fn new(db: Db, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            db,
            repository: PgBookingsRepository::new(),
            policy: BookingPolicy::default(),
            notifier,
        }
    }

    async fn transition(
        &self,
        tenant: TenantUuid,
        uuid: BookingUuid,
        transition: Transition,
    ) -> Result<Booking, BookingsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let booking = self
            .repository
            .get_booking_for_update(&mut tx, uuid)
            .await?;

        transition.validate(booking.status)?;

        let moved = self
            .repository
            .apply_transition(&mut tx, uuid, transition.target(), Timestamp::now())
            .await?;

        self.repository
            .resync_room_availability(&mut tx, moved.room_uuid)
            .await?;

        tx.commit().await?;

        info!(
            booking_number = %moved.booking_number,
            status = %moved.status,
            "booking moved"
        );

        Ok(moved)
    }

    /// Hands the confirmation off to the notifier after commit. Delivery
    /// problems are logged and dropped; they never unwind a booking.
    fn notify_created(&self, booking: &Booking) {
        let notifier = Arc::clone(&self.notifier);
        let booking = booking.clone();

        tokio::spawn(async move {
            if let Err(error) = notifier.booking_created(&booking).await {
                warn!(
                    booking_number = %booking.booking_number,
                    %error,
                    "booking notification dropped"
                );
            }
        });
    }
}

#[async_trait]
impl BookingsService for PgBookingsService {
    async fn create_booking(
        &self,
        tenant: TenantUuid,
        booking: NewBooking,
    ) -> Result<Booking, BookingsServiceError> {
        if booking.adults == 0 {
            return Err(BookingsServiceError::NoAdults);
        }

        let today = Zoned::now().date();
        let stay = Stay::new(
            booking.check_in_date,
            booking.check_out_date,
            today,
            &self.policy,
        )?;

        let mut attempts = 0;

        loop {
            attempts += 1;

            let mut tx = self.db.begin_tenant_transaction(tenant).await?;

            let room = self
                .repository
                .get_room_for_booking(&mut tx, booking.room_uuid)
                .await?;

            if room.hotel_uuid != booking.hotel_uuid {
                return Err(BookingsServiceError::RoomNotInHotel);
            }

            if !room.hotel_active {
                return Err(BookingsServiceError::HotelInactive);
            }

            let requested = u32::from(booking.adults) + u32::from(booking.children);

            if requested > u32::from(room.max_occupancy) {
                return Err(BookingsServiceError::OccupancyExceeded {
                    requested,
                    max: u32::from(room.max_occupancy),
                });
            }

            if self
                .repository
                .room_has_overlap(&mut tx, booking.room_uuid, stay)
                .await?
            {
                return Err(BookingsServiceError::RoomUnavailable);
            }

            let total_price = pricing::total_price(room.base_price, stay.nights())?;
            let total_price_minor = i64::try_from(total_price)?;

            let booking_number = number::generate(today, &mut rand::thread_rng());

            match self
                .repository
                .create_booking(
                    &mut tx,
                    booking.clone(),
                    &booking_number,
                    stay,
                    total_price_minor,
                )
                .await
            {
                Ok(created) => {
                    self.repository
                        .resync_room_availability(&mut tx, created.room_uuid)
                        .await?;

                    tx.commit().await?;

                    info!(
                        booking_number = %created.booking_number,
                        nights = created.nights(),
                        total_price = created.total_price,
                        "booking created"
                    );

                    self.notify_created(&created);

                    return Ok(created);
                }
                Err(error)
                    if is_booking_number_collision(&error)
                        && attempts < MAX_BOOKING_NUMBER_ATTEMPTS =>
                {
                    drop(tx);
                }
                Err(error) => return Err(error.into()),
            }
        }
    }

    async fn confirm_booking(
        &self,
        tenant: TenantUuid,
        uuid: BookingUuid,
    ) -> Result<Booking, BookingsServiceError> {
        self.transition(tenant, uuid, Transition::Confirm).await
    }

    async fn check_in(
        &self,
        tenant: TenantUuid,
        uuid: BookingUuid,
    ) -> Result<Booking, BookingsServiceError> {
        self.transition(tenant, uuid, Transition::CheckIn).await
    }

    async fn check_out(
        &self,
        tenant: TenantUuid,
        uuid: BookingUuid,
    ) -> Result<Booking, BookingsServiceError> {
        self.transition(tenant, uuid, Transition::CheckOut).await
    }

    async fn cancel_booking(
        &self,
        tenant: TenantUuid,
        uuid: BookingUuid,
    ) -> Result<Booking, BookingsServiceError> {
        self.transition(tenant, uuid, Transition::Cancel).await
    }

    async fn mark_no_show(
        &self,
        tenant: TenantUuid,
        uuid: BookingUuid,
    ) -> Result<Booking, BookingsServiceError> {
        self.transition(tenant, uuid, Transition::NoShow).await
    }

    async fn reassign_room(
        &self,
        tenant: TenantUuid,
        uuid: BookingUuid,
        room: RoomUuid,
    ) -> Result<Booking, BookingsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let booking = self
            .repository
            .get_booking_for_update(&mut tx, uuid)
            .await?;

        if !booking.status.occupies_room() {
            return Err(BookingsServiceError::NotActive);
        }

        if booking.room_uuid == room {
            tx.commit().await?;

            return Ok(booking);
        }

        // Lock both rooms in UUID order so crossing reassignments cannot
        // deadlock.
        let (first, second) = if booking.room_uuid < room {
            (booking.room_uuid, room)
        } else {
            (room, booking.room_uuid)
        };

        let first_room = self.repository.get_room_for_booking(&mut tx, first).await?;
        let second_room = self
            .repository
            .get_room_for_booking(&mut tx, second)
            .await?;

        let target = if first_room.room_uuid == room {
            first_room
        } else {
            second_room
        };

        if target.hotel_uuid != booking.hotel_uuid {
            return Err(BookingsServiceError::RoomNotInHotel);
        }

        let requested = u32::from(booking.adults) + u32::from(booking.children);

        if requested > u32::from(target.max_occupancy) {
            return Err(BookingsServiceError::OccupancyExceeded {
                requested,
                max: u32::from(target.max_occupancy),
            });
        }

        if self
            .repository
            .room_has_overlap(&mut tx, room, booking.stay)
            .await?
        {
            return Err(BookingsServiceError::RoomUnavailable);
        }

        // The agreed price travels with the booking; a room move does not
        // reprice the stay.
        let moved = self.repository.reassign_booking(&mut tx, uuid, room).await?;

        self.repository
            .resync_room_availability(&mut tx, booking.room_uuid)
            .await?;
        self.repository
            .resync_room_availability(&mut tx, room)
            .await?;

        tx.commit().await?;

        info!(
            booking_number = %moved.booking_number,
            from_room = %booking.room_uuid,
            to_room = %room,
            "booking reassigned"
        );

        Ok(moved)
    }

    async fn get_booking(
        &self,
        tenant: TenantUuid,
        uuid: BookingUuid,
    ) -> Result<Booking, BookingsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let booking = self.repository.get_booking(&mut tx, uuid).await?;

        tx.commit().await?;

        Ok(booking)
    }

    async fn list_bookings(
        &self,
        tenant: TenantUuid,
        filter: BookingFilter,
    ) -> Result<Vec<Booking>, BookingsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let bookings = self.repository.list_bookings(&mut tx, &filter).await?;

        tx.commit().await?;

        Ok(bookings)
    }

    async fn delete_booking(
        &self,
        tenant: TenantUuid,
        uuid: BookingUuid,
    ) -> Result<(), BookingsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let booking = self
            .repository
            .get_booking_for_update(&mut tx, uuid)
            .await?;

        if booking.status.occupies_room() {
            return Err(BookingsServiceError::StillActive);
        }

        let rows_affected = self.repository.soft_delete_booking(&mut tx, uuid).await?;

        if rows_affected == 0 {
            return Err(BookingsServiceError::NotFound);
        }

        tx.commit().await?;

        info!(booking_number = %booking.booking_number, "booking soft-deleted");

        Ok(())
    }
}

#[automock]
#[async_trait]
/// Booking lifecycle operations.
pub trait BookingsService: Send + Sync {
    /// Creates a booking after hotel, occupancy, calendar and pricing
    /// checks. The room must be free over the whole stay.
    async fn create_booking(
        &self,
        tenant: TenantUuid,
        booking: NewBooking,
    ) -> Result<Booking, BookingsServiceError>;

    /// Moves a pending booking to confirmed.
    async fn confirm_booking(
        &self,
        tenant: TenantUuid,
        uuid: BookingUuid,
    ) -> Result<Booking, BookingsServiceError>;

    /// Moves a confirmed booking to checked-in.
    async fn check_in(
        &self,
        tenant: TenantUuid,
        uuid: BookingUuid,
    ) -> Result<Booking, BookingsServiceError>;

    /// Moves a checked-in booking to checked-out.
    async fn check_out(
        &self,
        tenant: TenantUuid,
        uuid: BookingUuid,
    ) -> Result<Booking, BookingsServiceError>;

    /// Cancels a pending or confirmed booking, releasing its room.
    async fn cancel_booking(
        &self,
        tenant: TenantUuid,
        uuid: BookingUuid,
    ) -> Result<Booking, BookingsServiceError>;

    /// Marks a confirmed booking as a no-show. No timestamp is stamped.
    async fn mark_no_show(
        &self,
        tenant: TenantUuid,
        uuid: BookingUuid,
    ) -> Result<Booking, BookingsServiceError>;

    /// Moves a live booking to a free room in the same hotel. The agreed
    /// price is kept.
    async fn reassign_room(
        &self,
        tenant: TenantUuid,
        uuid: BookingUuid,
        room: RoomUuid,
    ) -> Result<Booking, BookingsServiceError>;

    /// Retrieves a single booking.
    async fn get_booking(
        &self,
        tenant: TenantUuid,
        uuid: BookingUuid,
    ) -> Result<Booking, BookingsServiceError>;

    /// Lists bookings matching `filter`, newest first.
    async fn list_bookings(
        &self,
        tenant: TenantUuid,
        filter: BookingFilter,
    ) -> Result<Vec<Booking>, BookingsServiceError>;

    /// Soft-deletes a settled booking. Live bookings must leave the
    /// lifecycle first.
    async fn delete_booking(
        &self,
        tenant: TenantUuid,
        uuid: BookingUuid,
    ) -> Result<(), BookingsServiceError>;
}

fn is_booking_number_collision(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .and_then(DatabaseError::constraint)
        == Some("bookings_booking_number_key")
}
