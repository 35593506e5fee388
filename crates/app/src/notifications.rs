//! Outbound Notifications
//!
//! Services hand finished work to a [`Notifier`] after their transaction
//! commits. Delivery is best-effort: a failed delivery is logged and
//! dropped, never bubbled back into the operation that triggered it.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use tracing::info;

use crate::domain::{bookings::models::Booking, payments::models::Payment};

/// A delivery that did not reach the guest.
#[derive(Debug, Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

#[automock]
#[async_trait]
/// Outbound guest messaging.
pub trait Notifier: Send + Sync {
    /// Announces a freshly created booking.
    async fn booking_created(&self, booking: &Booking) -> Result<(), NotifyError>;

    /// Announces a completed payment.
    async fn payment_received(&self, payment: &Payment) -> Result<(), NotifyError>;
}

/// Notifier that writes deliveries to the log. Stands in wherever no
/// outbound channel is configured.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn booking_created(&self, booking: &Booking) -> Result<(), NotifyError> {
        info!(
            booking_number = %booking.booking_number,
            check_in = %booking.stay.check_in(),
            check_out = %booking.stay.check_out(),
            "booking confirmation"
        );

        Ok(())
    }

    async fn payment_received(&self, payment: &Payment) -> Result<(), NotifyError> {
        info!(
            payment = %payment.uuid,
            booking = %payment.booking_uuid,
            amount = payment.amount,
            "payment receipt"
        );

        Ok(())
    }
}
