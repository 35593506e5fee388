//! Booking Numbers
//!
//! References look like `BK20250514-7GK2QD`: a date part for the day the
//! booking was taken and a random suffix. The suffix space is small enough
//! that collisions are possible on busy days, so creation retries under a
//! unique constraint rather than assuming the first draw is free.

use jiff::civil::Date;
use rand::Rng;

const SUFFIX_LEN: usize = 6;
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Draws a fresh booking reference for `today`.
pub(crate) fn generate<R: Rng>(today: Date, rng: &mut R) -> String {
    let mut suffix = String::with_capacity(SUFFIX_LEN);

    for _ in 0..SUFFIX_LEN {
        let index = rng.gen_range(0..ALPHABET.len());
        suffix.push(char::from(ALPHABET[index]));
    }

    format!(
        "BK{:04}{:02}{:02}-{suffix}",
        today.year(),
        today.month(),
        today.day()
    )
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::generate;

    #[test]
    fn references_carry_the_date_and_a_six_char_suffix() {
        let mut rng = StdRng::seed_from_u64(7);

        let reference = generate(date(2025, 5, 14), &mut rng);

        let (prefix, suffix) = reference.split_at(11);

        assert_eq!(&prefix[..10], "BK20250514");
        assert!(prefix.ends_with('-'));
        assert_eq!(suffix.len(), 6);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn single_digit_months_and_days_are_zero_padded() {
        let mut rng = StdRng::seed_from_u64(7);

        let reference = generate(date(2026, 1, 3), &mut rng);

        assert!(reference.starts_with("BK20260103-"));
    }
}
