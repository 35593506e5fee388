//! Payment Reconciliation Arithmetic
//!
//! A booking's `paid_amount` is never incremented in place. It is recomputed
//! from the set of completed payments after every payment mutation, so a
//! replayed webhook or a refund can never drift the cached figure away from
//! the ledger. Refunded and failed payment rows never count.

use thiserror::Error;

use crate::status::PaymentStatus;

/// Sum of completed payment amounts, in minor units.
#[must_use]
pub fn paid_total<I>(completed_amounts: I) -> u64
where
    I: IntoIterator<Item = u64>,
{
    completed_amounts
        .into_iter()
        .fold(0, |total, amount| total.saturating_add(amount))
}

/// Payment status implied by the ledger arithmetic.
///
/// Only the paid, partially-paid and pending corner of the vocabulary is
/// ever derived; `refunded` and `failed` are set by their explicit paths.
#[must_use]
pub fn payment_status_for(paid_minor: u64, total_minor: u64) -> PaymentStatus {
    if paid_minor >= total_minor {
        PaymentStatus::Paid
    } else if paid_minor > 0 {
        PaymentStatus::PartiallyPaid
    } else {
        PaymentStatus::Pending
    }
}

/// Outstanding balance, floored at zero.
#[must_use]
pub fn balance_due(total_minor: u64, paid_minor: u64) -> u64 {
    total_minor.saturating_sub(paid_minor)
}

/// Validates a tendered amount against the outstanding balance.
///
/// # Errors
///
/// Returns [`PaymentAmountError`] for zero amounts and for amounts that
/// would push `paid_amount` past `total_price`.
pub fn check_amount(amount_minor: u64, balance_due_minor: u64) -> Result<(), PaymentAmountError> {
    if amount_minor == 0 {
        return Err(PaymentAmountError::Zero);
    }
    if amount_minor > balance_due_minor {
        return Err(PaymentAmountError::ExceedsBalance {
            amount_minor,
            balance_due_minor,
        });
    }
    Ok(())
}

/// A payment amount the ledger will not accept.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentAmountError {
    /// Payments must move money.
    #[error("payment amount must be positive")]
    Zero,
    /// Accepting the amount would overpay the booking.
    #[error("payment of {amount_minor} exceeds the outstanding balance of {balance_due_minor}")]
    ExceedsBalance {
        /// Tendered amount in minor units.
        amount_minor: u64,
        /// Outstanding balance in minor units.
        balance_due_minor: u64,
    },
}
