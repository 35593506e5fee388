//! Stay Intervals
//!
//! A stay is the half-open date interval `[check_in, check_out)`. The
//! checkout day is excluded, so a booking leaving on the day another
//! arrives does not overlap it and back-to-back occupancy works without
//! special cases.

use jiff::civil::Date;
use thiserror::Error;

use crate::status::BookingStatus;

/// Stay-length policy applied when bookings are created.
#[derive(Clone, Copy, Debug)]
pub struct BookingPolicy {
    /// Longest bookable stay, in nights.
    pub max_nights: u32,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self { max_nights: 30 }
    }
}

/// A validated half-open `[check_in, check_out)` date interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Stay {
    check_in: Date,
    check_out: Date,
}

impl Stay {
    /// Builds a stay a guest may book today.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidStayError`] when `check_out` is not after
    /// `check_in`, when `check_in` is before `today`, or when the stay is
    /// longer than `policy.max_nights`.
    pub fn new(
        check_in: Date,
        check_out: Date,
        today: Date,
        policy: &BookingPolicy,
    ) -> Result<Self, InvalidStayError> {
        let stay = Self::from_dates(check_in, check_out)?;
        if check_in < today {
            return Err(InvalidStayError::CheckInInPast { check_in, today });
        }
        let nights = stay.nights();
        if nights > policy.max_nights {
            return Err(InvalidStayError::TooLong {
                nights,
                max_nights: policy.max_nights,
            });
        }
        Ok(stay)
    }

    /// Rebuilds a stay from dates that already passed booking validation,
    /// checking only that the interval is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidStayError::CheckOutNotAfterCheckIn`] when the
    /// interval is empty or inverted.
    pub fn from_dates(check_in: Date, check_out: Date) -> Result<Self, InvalidStayError> {
        if check_out <= check_in {
            return Err(InvalidStayError::CheckOutNotAfterCheckIn {
                check_in,
                check_out,
            });
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// First night of the stay.
    #[must_use]
    pub const fn check_in(self) -> Date {
        self.check_in
    }

    /// Checkout day. Not part of the interval.
    #[must_use]
    pub const fn check_out(self) -> Date {
        self.check_out
    }

    /// Number of nights between arrival and checkout.
    #[must_use]
    pub fn nights(self) -> u32 {
        let days = (self.check_out - self.check_in).get_days();
        u32::try_from(days).unwrap_or(0)
    }

    /// Strict half-open interval overlap with `other`.
    #[must_use]
    pub fn overlaps(self, other: Self) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }

    /// Whether `date` falls on a night of this stay.
    #[must_use]
    pub fn contains(self, date: Date) -> bool {
        self.check_in <= date && date < self.check_out
    }
}

/// Whether the booking is still ahead of `today` and heading for arrival.
#[must_use]
pub fn is_upcoming(stay: Stay, status: BookingStatus, today: Date) -> bool {
    stay.check_in() > today
        && !matches!(status, BookingStatus::Cancelled | BookingStatus::NoShow)
}

/// Whether the guest is, or should be, in the house on `today`.
///
/// The checkout day counts as active so day-of-departure operations still
/// see the booking.
#[must_use]
pub fn is_active(stay: Stay, status: BookingStatus, today: Date) -> bool {
    stay.check_in() <= today
        && today <= stay.check_out()
        && !matches!(
            status,
            BookingStatus::Cancelled | BookingStatus::CheckedOut | BookingStatus::NoShow
        )
}

/// A date range that cannot be booked.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidStayError {
    /// The interval is empty or inverted.
    #[error("check-out {check_out} must be after check-in {check_in}")]
    CheckOutNotAfterCheckIn {
        /// Requested arrival day.
        check_in: Date,
        /// Requested checkout day.
        check_out: Date,
    },
    /// Arrival would predate the booking date.
    #[error("check-in {check_in} is in the past (today is {today})")]
    CheckInInPast {
        /// Requested arrival day.
        check_in: Date,
        /// The day the booking was attempted.
        today: Date,
    },
    /// The stay is longer than the maximum length policy allows.
    #[error("{nights} nights exceeds the maximum stay of {max_nights}")]
    TooLong {
        /// Requested stay length.
        nights: u32,
        /// Longest bookable stay.
        max_nights: u32,
    },
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use testresult::TestResult;

    use super::{BookingPolicy, InvalidStayError, Stay, is_active, is_upcoming};
    use crate::status::BookingStatus;

    const POLICY: BookingPolicy = BookingPolicy { max_nights: 30 };

    #[test]
    fn a_stay_counts_its_nights() -> TestResult {
        let stay = Stay::new(
            date(2026, 6, 1),
            date(2026, 6, 4),
            date(2026, 5, 20),
            &POLICY,
        )?;
        assert_eq!(stay.nights(), 3);
        Ok(())
    }

    #[test]
    fn empty_and_inverted_intervals_are_rejected() {
        let today = date(2026, 5, 20);
        assert_eq!(
            Stay::new(date(2026, 6, 1), date(2026, 6, 1), today, &POLICY),
            Err(InvalidStayError::CheckOutNotAfterCheckIn {
                check_in: date(2026, 6, 1),
                check_out: date(2026, 6, 1),
            })
        );
        assert!(Stay::new(date(2026, 6, 4), date(2026, 6, 1), today, &POLICY).is_err());
    }

    #[test]
    fn past_arrivals_are_rejected_but_today_is_bookable() -> TestResult {
        let today = date(2026, 5, 20);
        assert_eq!(
            Stay::new(date(2026, 5, 19), date(2026, 5, 22), today, &POLICY),
            Err(InvalidStayError::CheckInInPast {
                check_in: date(2026, 5, 19),
                today,
            })
        );
        let same_day = Stay::new(date(2026, 5, 20), date(2026, 5, 22), today, &POLICY)?;
        assert_eq!(same_day.nights(), 2);
        Ok(())
    }

    #[test]
    fn the_maximum_stay_is_inclusive() -> TestResult {
        let today = date(2026, 5, 20);
        let longest = Stay::new(date(2026, 6, 1), date(2026, 7, 1), today, &POLICY)?;
        assert_eq!(longest.nights(), 30);
        assert_eq!(
            Stay::new(date(2026, 6, 1), date(2026, 7, 2), today, &POLICY),
            Err(InvalidStayError::TooLong {
                nights: 31,
                max_nights: 30,
            })
        );
        Ok(())
    }

    #[test]
    fn back_to_back_stays_do_not_overlap() -> TestResult {
        let first = Stay::from_dates(date(2026, 6, 1), date(2026, 6, 5))?;
        let second = Stay::from_dates(date(2026, 6, 5), date(2026, 6, 9))?;
        assert!(!first.overlaps(second));
        assert!(!second.overlaps(first));
        Ok(())
    }

    #[test]
    fn sharing_a_night_overlaps() -> TestResult {
        let first = Stay::from_dates(date(2026, 6, 1), date(2026, 6, 5))?;
        let second = Stay::from_dates(date(2026, 6, 4), date(2026, 6, 6))?;
        assert!(first.overlaps(second));
        assert!(second.overlaps(first));
        Ok(())
    }

    #[test]
    fn the_checkout_day_is_outside_the_interval() -> TestResult {
        let stay = Stay::from_dates(date(2026, 6, 1), date(2026, 6, 5))?;
        assert!(stay.contains(date(2026, 6, 1)));
        assert!(stay.contains(date(2026, 6, 4)));
        assert!(!stay.contains(date(2026, 6, 5)));
        Ok(())
    }

    #[test]
    fn upcoming_and_active_respect_status_and_dates() -> TestResult {
        let stay = Stay::from_dates(date(2026, 6, 1), date(2026, 6, 5))?;

        assert!(is_upcoming(stay, BookingStatus::Confirmed, date(2026, 5, 20)));
        assert!(!is_upcoming(stay, BookingStatus::Cancelled, date(2026, 5, 20)));
        assert!(!is_upcoming(stay, BookingStatus::Confirmed, date(2026, 6, 1)));

        assert!(is_active(stay, BookingStatus::CheckedIn, date(2026, 6, 3)));
        assert!(
            is_active(stay, BookingStatus::CheckedIn, date(2026, 6, 5)),
            "checkout day should still be active"
        );
        assert!(!is_active(stay, BookingStatus::CheckedOut, date(2026, 6, 5)));
        assert!(!is_active(stay, BookingStatus::CheckedIn, date(2026, 6, 6)));
        Ok(())
    }
}
