//! End-to-end walks of the booking lifecycle and the payment arithmetic,
//! exercised the way the application layer drives them.

use jiff::civil::date;
use parador::pricing::total_price;
use parador::reconcile::{balance_due, check_amount, paid_total, payment_status_for};
use parador::status::{BookingStatus, PaymentStatus};
use parador::stay::{BookingPolicy, Stay};
use parador::transition::Transition;
use testresult::TestResult;

#[test]
fn a_stay_is_priced_walked_and_paid_off() -> TestResult {
    let policy = BookingPolicy::default();
    let stay = Stay::new(
        date(2026, 6, 1),
        date(2026, 6, 4),
        date(2026, 5, 1),
        &policy,
    )?;
    let total = total_price(100_00, stay.nights())?;
    assert_eq!(total, 300_00);

    // pending -> confirmed -> checked_in -> checked_out
    let mut status = BookingStatus::Pending;
    for transition in [Transition::Confirm, Transition::CheckIn, Transition::CheckOut] {
        transition.validate(status)?;
        status = transition.target();
    }
    assert_eq!(status, BookingStatus::CheckedOut);
    assert!(status.is_terminal());

    let mut completed: Vec<u64> = vec![];
    check_amount(100_00, balance_due(total, paid_total(completed.iter().copied())))?;
    completed.push(100_00);
    let paid = paid_total(completed.iter().copied());
    assert_eq!(payment_status_for(paid, total), PaymentStatus::PartiallyPaid);
    assert_eq!(balance_due(total, paid), 200_00);

    check_amount(200_00, balance_due(total, paid))?;
    completed.push(200_00);
    let paid = paid_total(completed.iter().copied());
    assert_eq!(payment_status_for(paid, total), PaymentStatus::Paid);
    assert_eq!(balance_due(total, paid), 0);

    // Nothing left to settle, so a further charge is refused.
    assert!(check_amount(50_00, balance_due(total, paid)).is_err());
    Ok(())
}

#[test]
fn a_cancelled_booking_frees_its_room_and_stops_moving() -> TestResult {
    Transition::Cancel.validate(BookingStatus::Confirmed)?;
    let status = Transition::Cancel.target();
    assert!(!status.occupies_room());
    assert!(Transition::Confirm.validate(status).is_err());
    Ok(())
}

#[test]
fn no_show_is_reachable_only_from_confirmed() {
    assert!(Transition::NoShow.validate(BookingStatus::Confirmed).is_ok());
    assert!(Transition::NoShow.validate(BookingStatus::Pending).is_err());
    assert!(Transition::NoShow.validate(BookingStatus::CheckedIn).is_err());
    assert!(Transition::NoShow.stamp().is_none());
}

#[test]
fn refund_arithmetic_recomputes_from_the_remaining_set() {
    let paid = paid_total([100_00, 200_00]);
    assert_eq!(payment_status_for(paid, 300_00), PaymentStatus::Paid);

    // The first payment is refunded; only the remaining completed row counts.
    let after_refund = paid_total([200_00]);
    assert_eq!(after_refund, 200_00);
    assert_eq!(
        payment_status_for(after_refund, 300_00),
        PaymentStatus::PartiallyPaid
    );
}
