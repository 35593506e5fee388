//! Booking Vocabulary
//!
//! The string forms returned by [`as_str`](BookingStatus::as_str) are the
//! wire and database representations; serde uses the same spelling.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle states a booking moves through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Created and holding room inventory, awaiting confirmation.
    Pending,
    /// Confirmed. Still holds room inventory.
    Confirmed,
    /// Guest is in the house.
    CheckedIn,
    /// Stay completed. Terminal.
    CheckedOut,
    /// Withdrawn before the stay. Terminal.
    Cancelled,
    /// Guest never arrived. Terminal.
    NoShow,
}

impl BookingStatus {
    /// The statuses that hold room inventory for their stay dates.
    pub const OCCUPYING: [Self; 3] = [Self::Pending, Self::Confirmed, Self::CheckedIn];

    /// Wire and database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::CheckedIn => "checked_in",
            Self::CheckedOut => "checked_out",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
        }
    }

    /// Whether a booking in this status blocks its room for the stay dates.
    #[must_use]
    pub const fn occupies_room(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed | Self::CheckedIn)
    }

    /// Whether the lifecycle has ended. Terminal bookings accept no further
    /// transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::CheckedOut | Self::Cancelled | Self::NoShow)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = UnknownValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "checked_in" => Ok(Self::CheckedIn),
            "checked_out" => Ok(Self::CheckedOut),
            "cancelled" => Ok(Self::Cancelled),
            "no_show" => Ok(Self::NoShow),
            other => Err(UnknownValueError::new("booking status", other)),
        }
    }
}

/// Where a booking's payment stands against its total price.
///
/// `pending`, `partially_paid` and `paid` are derived from the ledger
/// arithmetic in [`crate::reconcile`]; `refunded` and `failed` are set only
/// by the explicit refund and failure paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// No completed money yet.
    Pending,
    /// Some completed money, below the total price.
    PartiallyPaid,
    /// Completed money covers the total price.
    Paid,
    /// All completed money was returned.
    Refunded,
    /// A gateway attempt failed before any money completed.
    Failed,
}

impl PaymentStatus {
    /// Wire and database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PartiallyPaid => "partially_paid",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "partially_paid" => Ok(Self::PartiallyPaid),
            "paid" => Ok(Self::Paid),
            "refunded" => Ok(Self::Refunded),
            "failed" => Ok(Self::Failed),
            other => Err(UnknownValueError::new("payment status", other)),
        }
    }
}

/// Channel a booking arrived through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingSource {
    /// Direct web booking.
    Website,
    /// Direct mobile app booking.
    MobileApp,
    /// Taken over the phone by staff.
    Phone,
    /// Walk-in at the front desk.
    WalkIn,
    /// Channel manager or agency feed.
    ThirdParty,
}

impl BookingSource {
    /// Wire and database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Website => "website",
            Self::MobileApp => "mobile_app",
            Self::Phone => "phone",
            Self::WalkIn => "walk_in",
            Self::ThirdParty => "third_party",
        }
    }
}

impl fmt::Display for BookingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingSource {
    type Err = UnknownValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "website" => Ok(Self::Website),
            "mobile_app" => Ok(Self::MobileApp),
            "phone" => Ok(Self::Phone),
            "walk_in" => Ok(Self::WalkIn),
            "third_party" => Ok(Self::ThirdParty),
            other => Err(UnknownValueError::new("booking source", other)),
        }
    }
}

/// How a payment was tendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Credit card, gateway or terminal.
    CreditCard,
    /// Debit card, gateway or terminal.
    DebitCard,
    /// PayPal checkout.
    Paypal,
    /// Bank transfer reconciled by an operator.
    BankTransfer,
    /// Cash at the front desk.
    Cash,
}

impl PaymentMethod {
    /// Wire and database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreditCard => "credit_card",
            Self::DebitCard => "debit_card",
            Self::Paypal => "paypal",
            Self::BankTransfer => "bank_transfer",
            Self::Cash => "cash",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit_card" => Ok(Self::CreditCard),
            "debit_card" => Ok(Self::DebitCard),
            "paypal" => Ok(Self::Paypal),
            "bank_transfer" => Ok(Self::BankTransfer),
            "cash" => Ok(Self::Cash),
            other => Err(UnknownValueError::new("payment method", other)),
        }
    }
}

/// Lifecycle of a single payment row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    /// Initiated, not yet settled.
    Pending,
    /// Money moved. Counts toward `paid_amount`.
    Completed,
    /// The attempt failed. Never counts.
    Failed,
    /// Completed money returned. No longer counts.
    Refunded,
}

impl PaymentState {
    /// Wire and database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentState {
    type Err = UnknownValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            other => Err(UnknownValueError::new("payment state", other)),
        }
    }
}

/// A vocabulary string that names no known value.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {vocabulary} `{value}`")]
pub struct UnknownValueError {
    /// Which vocabulary was being parsed.
    pub vocabulary: &'static str,
    /// The rejected input.
    pub value: String,
}

impl UnknownValueError {
    fn new(vocabulary: &'static str, value: &str) -> Self {
        Self {
            vocabulary,
            value: value.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{BookingStatus, PaymentState, PaymentStatus, UnknownValueError};

    #[test]
    fn statuses_round_trip_through_their_string_form() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::CheckedIn,
            BookingStatus::CheckedOut,
            BookingStatus::Cancelled,
            BookingStatus::NoShow,
        ] {
            assert_eq!(BookingStatus::from_str(status.as_str()), Ok(status));
        }
    }

    #[test]
    fn exactly_the_active_statuses_occupy_rooms() {
        assert!(BookingStatus::Pending.occupies_room());
        assert!(BookingStatus::Confirmed.occupies_room());
        assert!(BookingStatus::CheckedIn.occupies_room());
        assert!(!BookingStatus::CheckedOut.occupies_room());
        assert!(!BookingStatus::Cancelled.occupies_room());
        assert!(!BookingStatus::NoShow.occupies_room());
    }

    #[test]
    fn occupying_and_terminal_partition_the_statuses() {
        for status in BookingStatus::OCCUPYING {
            assert!(!status.is_terminal(), "{status} is both occupying and terminal");
        }
        for status in [
            BookingStatus::CheckedOut,
            BookingStatus::Cancelled,
            BookingStatus::NoShow,
        ] {
            assert!(!status.occupies_room(), "{status} is terminal yet occupies a room");
        }
    }

    #[test]
    fn unknown_strings_are_rejected_with_the_offending_value() {
        assert_eq!(
            PaymentStatus::from_str("settled"),
            Err(UnknownValueError {
                vocabulary: "payment status",
                value: "settled".to_owned(),
            })
        );
        assert!(PaymentState::from_str("chargeback").is_err());
    }
}
