//! Booking Lifecycle Transitions
//!
//! The transition table is the single source of truth for which lifecycle
//! moves are legal. Terminal statuses have no outgoing edges; re-applying a
//! transition is rejected rather than treated as idempotent, so a stale
//! caller learns it acted on old state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::status::BookingStatus;

/// Lifecycle operations that move a booking between statuses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// `pending` to `confirmed`.
    Confirm,
    /// `confirmed` to `checked_in`.
    CheckIn,
    /// `checked_in` to `checked_out`.
    CheckOut,
    /// `pending` or `confirmed` to `cancelled`.
    Cancel,
    /// `confirmed` to `no_show`.
    NoShow,
}

/// Booking timestamp recorded when a transition lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimestampField {
    /// Set by [`Transition::Confirm`].
    ConfirmedAt,
    /// Set by [`Transition::CheckIn`].
    CheckedInAt,
    /// Set by [`Transition::CheckOut`].
    CheckedOutAt,
    /// Set by [`Transition::Cancel`].
    CancelledAt,
}

/// Statuses reachable from `from` in one legal transition.
#[must_use]
pub const fn allowed_targets(from: BookingStatus) -> &'static [BookingStatus] {
    match from {
        BookingStatus::Pending => &[BookingStatus::Confirmed, BookingStatus::Cancelled],
        BookingStatus::Confirmed => &[
            BookingStatus::CheckedIn,
            BookingStatus::Cancelled,
            BookingStatus::NoShow,
        ],
        BookingStatus::CheckedIn => &[BookingStatus::CheckedOut],
        BookingStatus::CheckedOut | BookingStatus::Cancelled | BookingStatus::NoShow => &[],
    }
}

impl Transition {
    /// The status this transition lands in.
    #[must_use]
    pub const fn target(self) -> BookingStatus {
        match self {
            Self::Confirm => BookingStatus::Confirmed,
            Self::CheckIn => BookingStatus::CheckedIn,
            Self::CheckOut => BookingStatus::CheckedOut,
            Self::Cancel => BookingStatus::Cancelled,
            Self::NoShow => BookingStatus::NoShow,
        }
    }

    /// The timestamp this transition records. Marking a no-show records
    /// nothing.
    #[must_use]
    pub const fn stamp(self) -> Option<TimestampField> {
        match self {
            Self::Confirm => Some(TimestampField::ConfirmedAt),
            Self::CheckIn => Some(TimestampField::CheckedInAt),
            Self::CheckOut => Some(TimestampField::CheckedOutAt),
            Self::Cancel => Some(TimestampField::CancelledAt),
            Self::NoShow => None,
        }
    }

    /// Checks that this transition has an edge from `from` in the table.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] carrying the current status, the rejected
    /// target and the legal alternatives when no such edge exists.
    pub fn validate(self, from: BookingStatus) -> Result<(), TransitionError> {
        let allowed = allowed_targets(from);
        if allowed.contains(&self.target()) {
            Ok(())
        } else {
            Err(TransitionError {
                from,
                to: self.target(),
                allowed,
            })
        }
    }
}

/// A lifecycle move with no edge in the transition table.
#[derive(Debug, Error, PartialEq, Eq)]
#[error(
    "cannot move booking from {from} to {to}; allowed from {from}: {}",
    format_allowed(.allowed)
)]
pub struct TransitionError {
    /// Status the booking is currently in.
    pub from: BookingStatus,
    /// Status the rejected transition would have landed in.
    pub to: BookingStatus,
    /// Targets that are legal from `from`.
    pub allowed: &'static [BookingStatus],
}

fn format_allowed(allowed: &[BookingStatus]) -> String {
    if allowed.is_empty() {
        "none".to_owned()
    } else {
        allowed
            .iter()
            .map(|status| status.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::{Transition, TransitionError, allowed_targets};
    use crate::status::BookingStatus;

    const ALL_STATUSES: [BookingStatus; 6] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::CheckedIn,
        BookingStatus::CheckedOut,
        BookingStatus::Cancelled,
        BookingStatus::NoShow,
    ];

    const ALL_TRANSITIONS: [Transition; 5] = [
        Transition::Confirm,
        Transition::CheckIn,
        Transition::CheckOut,
        Transition::Cancel,
        Transition::NoShow,
    ];

    #[test]
    fn only_the_documented_edges_are_legal() {
        let legal = [
            (BookingStatus::Pending, Transition::Confirm),
            (BookingStatus::Pending, Transition::Cancel),
            (BookingStatus::Confirmed, Transition::CheckIn),
            (BookingStatus::Confirmed, Transition::Cancel),
            (BookingStatus::Confirmed, Transition::NoShow),
            (BookingStatus::CheckedIn, Transition::CheckOut),
        ];
        for from in ALL_STATUSES {
            for transition in ALL_TRANSITIONS {
                let expected = legal.contains(&(from, transition));
                assert_eq!(
                    transition.validate(from).is_ok(),
                    expected,
                    "{from} -> {transition:?}"
                );
            }
        }
    }

    #[test]
    fn terminal_statuses_have_no_exits() {
        for status in [
            BookingStatus::CheckedOut,
            BookingStatus::Cancelled,
            BookingStatus::NoShow,
        ] {
            assert!(status.is_terminal(), "{status} should be terminal");
            assert!(allowed_targets(status).is_empty(), "{status} has exits");
        }
    }

    #[test]
    fn rejections_carry_the_allowed_alternatives() {
        assert_eq!(
            Transition::CheckIn.validate(BookingStatus::Pending),
            Err(TransitionError {
                from: BookingStatus::Pending,
                to: BookingStatus::CheckedIn,
                allowed: &[BookingStatus::Confirmed, BookingStatus::Cancelled],
            })
        );
        let message = match Transition::Cancel.validate(BookingStatus::CheckedOut) {
            Err(error) => error.to_string(),
            Ok(()) => String::new(),
        };
        assert_eq!(
            message,
            "cannot move booking from checked_out to cancelled; allowed from checked_out: none"
        );
    }

    #[test]
    fn every_transition_except_no_show_records_a_stamp() {
        for transition in ALL_TRANSITIONS {
            match transition {
                Transition::NoShow => assert!(transition.stamp().is_none(), "no_show stamps"),
                _ => assert!(transition.stamp().is_some(), "{transition:?} records nothing"),
            }
        }
    }
}
