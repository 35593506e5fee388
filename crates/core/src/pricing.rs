//! Stay Pricing
//!
//! Prices are integer minor units throughout. The total is fixed when the
//! booking is created and is not recomputed afterwards, including on room
//! reassignment.

use thiserror::Error;

/// Total stay price: nightly rate times nights.
///
/// # Errors
///
/// Returns [`PriceOverflowError`] when the multiplication leaves the
/// minor-unit range.
pub fn total_price(base_price_minor: u64, nights: u32) -> Result<u64, PriceOverflowError> {
    base_price_minor
        .checked_mul(u64::from(nights))
        .ok_or(PriceOverflowError {
            base_price_minor,
            nights,
        })
}

/// A nightly rate and stay length whose product leaves the minor-unit range.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("pricing {nights} nights at {base_price_minor} minor units overflows")]
pub struct PriceOverflowError {
    /// Nightly rate in minor units.
    pub base_price_minor: u64,
    /// Stay length in nights.
    pub nights: u32,
}
