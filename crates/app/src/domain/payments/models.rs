//! Payment Models

use jiff::Timestamp;
use parador::status::{PaymentMethod, PaymentState};
use serde::Deserialize;

use crate::domain::bookings::models::BookingUuid;
use crate::uuids::TypedUuid;

/// Payment UUID
pub type PaymentUuid = TypedUuid<Payment>;

/// Payment Model
///
/// One row per attempt to move money against a booking. The booking's
/// `paid_amount` is always the sum over this ledger's completed rows.
#[derive(Debug, Clone)]
pub struct Payment {
    /// Unique payment identifier.
    pub uuid: PaymentUuid,

    /// Booking the money applies to.
    pub booking_uuid: BookingUuid,

    /// Amount in minor currency units.
    pub amount: u64,

    /// Instrument the guest paid with.
    pub method: PaymentMethod,

    /// Gateway charge reference, present for gateway-settled payments.
    pub transaction_id: Option<String>,

    /// Where the attempt ended up.
    pub state: PaymentState,

    /// Free-text notes from the operator.
    pub notes: Option<String>,

    /// Creation timestamp.
    pub created_at: Timestamp,

    /// Last update timestamp.
    pub updated_at: Timestamp,

    /// Soft-delete timestamp when deleted.
    pub deleted_at: Option<Timestamp>,
}

/// New Payment Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    /// UUID to assign to the payment row.
    pub uuid: PaymentUuid,

    /// Amount in minor currency units.
    pub amount: u64,

    /// Instrument the guest paid with.
    pub method: PaymentMethod,

    /// Cross-system reference; must be unique among live payments when set.
    pub transaction_id: Option<String>,

    /// Free-text notes from the operator.
    pub notes: Option<String>,
}

/// What the gateway says happened to a charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayOutcome {
    Succeeded,
    Failed,
}

/// A settlement notice delivered by the payment gateway.
///
/// Deliveries are at-least-once; `transaction_id` deduplicates replays.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GatewayPaymentEvent {
    /// Gateway-side charge reference.
    pub transaction_id: String,

    /// Booking the charge settles.
    pub booking: BookingUuid,

    /// Amount in minor currency units.
    pub amount: u64,

    /// Instrument the guest paid with.
    pub method: PaymentMethod,

    /// Charge outcome.
    pub outcome: GatewayOutcome,
}

/// Booking money facts read while the ledger changes.
#[derive(Debug, Clone)]
pub(crate) struct BookingBalance {
    pub booking_uuid: BookingUuid,
    pub total_price: u64,
    pub paid_amount: u64,
}

#[cfg(test)]
mod tests {
    use parador::status::PaymentMethod;
    use testresult::TestResult;

    use super::{GatewayOutcome, GatewayPaymentEvent};

    #[test]
    fn gateway_events_deserialize_from_wire_json() -> TestResult {
        let raw = r#"{
            "transaction_id": "txn_9f30c2",
            "booking": "01912345-6789-7abc-def0-123456789abc",
            "amount": 15000,
            "method": "credit_card",
            "outcome": "succeeded"
        }"#;

        let event: GatewayPaymentEvent = serde_json::from_str(raw)?;

        assert_eq!(event.transaction_id, "txn_9f30c2");
        assert_eq!(event.amount, 15000);
        assert_eq!(event.method, PaymentMethod::CreditCard);
        assert_eq!(event.outcome, GatewayOutcome::Succeeded);

        Ok(())
    }

    #[test]
    fn unknown_gateway_outcomes_are_rejected() {
        let raw = r#"{
            "transaction_id": "txn_9f30c2",
            "booking": "01912345-6789-7abc-def0-123456789abc",
            "amount": 15000,
            "method": "credit_card",
            "outcome": "charged_back"
        }"#;

        let result = serde_json::from_str::<GatewayPaymentEvent>(raw);

        assert!(result.is_err());
    }
}
