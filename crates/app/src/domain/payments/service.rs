//! Payments service.
//!
//! Every ledger mutation locks the booking row first, recomputes
//! `paid_amount` from the completed payments and writes the derived
//! payment status back inside the same transaction. The cached figures
//! on the booking are outputs of the ledger, never inputs.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use parador::{
    reconcile,
    status::{PaymentState, PaymentStatus},
};
use sqlx::{Postgres, Transaction};
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        bookings::models::BookingUuid,
        payments::{
            errors::PaymentsServiceError,
            models::{GatewayOutcome, GatewayPaymentEvent, NewPayment, Payment, PaymentUuid},
            repository::PgPaymentsRepository,
        },
        tenants::records::TenantUuid,
    },
    notifications::Notifier,
};

#[derive(Clone)]
pub struct PgPaymentsService {
    db: Db,
    repository: PgPaymentsRepository,
    notifier: Arc<dyn Notifier>,
}

impl PgPaymentsService {
    #[must_use]
    pub fn new(db: Db, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            db,
            repository: PgPaymentsRepository::new(),
            notifier,
        }
    }

    /// Rewrites the booking's money summary from the completed rows of
    /// its ledger.
    async fn reconcile_booking(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: BookingUuid,
        total_price: u64,
    ) -> Result<(), PaymentsServiceError> {
        let paid = self.repository.sum_completed_payments(tx, booking).await?;
        let status = reconcile::payment_status_for(paid, total_price);

        self.repository
            .update_booking_payment(tx, booking, i64::try_from(paid)?, status)
            .await?;

        Ok(())
    }

    /// Hands the receipt off to the notifier after commit. Delivery
    /// problems are logged and dropped; they never unwind a payment.
    fn notify_received(&self, payment: &Payment) {
        let notifier = Arc::clone(&self.notifier);
        let payment = payment.clone();

        tokio::spawn(async move {
            if let Err(error) = notifier.payment_received(&payment).await {
                warn!(
                    payment = %payment.uuid,
                    %error,
                    "payment notification dropped"
                );
            }
        });
    }
}

#[async_trait]
impl PaymentsService for PgPaymentsService {
    async fn record_payment(
        &self,
        tenant: TenantUuid,
        booking: BookingUuid,
        payment: NewPayment,
    ) -> Result<Payment, PaymentsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let balance = self
            .repository
            .get_booking_balance_for_update(&mut tx, booking)
            .await?;

        reconcile::check_amount(
            payment.amount,
            reconcile::balance_due(balance.total_price, balance.paid_amount),
        )?;

        let amount_minor = i64::try_from(payment.amount)?;

        let created = self
            .repository
            .create_payment(&mut tx, booking, payment, PaymentState::Completed, amount_minor)
            .await?;

        self.reconcile_booking(&mut tx, booking, balance.total_price)
            .await?;

        tx.commit().await?;

        info!(
            payment = %created.uuid,
            booking = %created.booking_uuid,
            amount = created.amount,
            "payment recorded"
        );

        self.notify_received(&created);

        Ok(created)
    }

    async fn apply_gateway_event(
        &self,
        tenant: TenantUuid,
        event: GatewayPaymentEvent,
    ) -> Result<Payment, PaymentsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        // Lock the booking before the dedupe probe so concurrent
        // deliveries of one event serialize and the loser sees the
        // winner's row.
        let balance = self
            .repository
            .get_booking_balance_for_update(&mut tx, event.booking)
            .await?;

        if let Some(existing) = self
            .repository
            .find_payment_by_transaction_id(&mut tx, &event.transaction_id)
            .await?
        {
            tx.commit().await?;

            info!(
                transaction_id = %event.transaction_id,
                payment = %existing.uuid,
                "gateway replay ignored"
            );

            return Ok(existing);
        }

        let payment = NewPayment {
            uuid: PaymentUuid::new(),
            amount: event.amount,
            method: event.method,
            transaction_id: Some(event.transaction_id.clone()),
            notes: None,
        };

        let amount_minor = i64::try_from(event.amount)?;

        let created = match event.outcome {
            GatewayOutcome::Succeeded => {
                reconcile::check_amount(
                    event.amount,
                    reconcile::balance_due(balance.total_price, balance.paid_amount),
                )?;

                let created = self
                    .repository
                    .create_payment(
                        &mut tx,
                        event.booking,
                        payment,
                        PaymentState::Completed,
                        amount_minor,
                    )
                    .await?;

                self.reconcile_booking(&mut tx, event.booking, balance.total_price)
                    .await?;

                created
            }
            GatewayOutcome::Failed => {
                let created = self
                    .repository
                    .create_payment(
                        &mut tx,
                        event.booking,
                        payment,
                        PaymentState::Failed,
                        amount_minor,
                    )
                    .await?;

                // The failure flag only lands while the booking holds no
                // completed money.
                if balance.paid_amount == 0 {
                    self.repository
                        .update_booking_payment(&mut tx, event.booking, 0, PaymentStatus::Failed)
                        .await?;
                }

                created
            }
        };

        tx.commit().await?;

        info!(
            transaction_id = %event.transaction_id,
            payment = %created.uuid,
            state = %created.state,
            "gateway event applied"
        );

        if created.state == PaymentState::Completed {
            self.notify_received(&created);
        }

        Ok(created)
    }

    async fn refund_payment(
        &self,
        tenant: TenantUuid,
        payment: PaymentUuid,
    ) -> Result<Payment, PaymentsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let found = self
            .repository
            .get_payment_for_update(&mut tx, payment)
            .await?;

        if found.state != PaymentState::Completed {
            return Err(PaymentsServiceError::NotCompleted { state: found.state });
        }

        let balance = self
            .repository
            .get_booking_balance_for_update(&mut tx, found.booking_uuid)
            .await?;

        let refunded = self
            .repository
            .mark_payment_refunded(&mut tx, payment)
            .await?;

        let paid = self
            .repository
            .sum_completed_payments(&mut tx, found.booking_uuid)
            .await?;

        // A booking whose last completed money has been handed back reads
        // as refunded, not as pending.
        let status = if paid == 0 {
            PaymentStatus::Refunded
        } else {
            reconcile::payment_status_for(paid, balance.total_price)
        };

        self.repository
            .update_booking_payment(&mut tx, found.booking_uuid, i64::try_from(paid)?, status)
            .await?;

        tx.commit().await?;

        info!(
            payment = %refunded.uuid,
            booking = %refunded.booking_uuid,
            amount = refunded.amount,
            "payment refunded"
        );

        Ok(refunded)
    }

    async fn balance_due(
        &self,
        tenant: TenantUuid,
        booking: BookingUuid,
    ) -> Result<u64, PaymentsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let balance = self.repository.get_booking_balance(&mut tx, booking).await?;

        tx.commit().await?;

        Ok(reconcile::balance_due(
            balance.total_price,
            balance.paid_amount,
        ))
    }

    async fn list_payments(
        &self,
        tenant: TenantUuid,
        booking: BookingUuid,
    ) -> Result<Vec<Payment>, PaymentsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        // Resolve the booking first so an unknown booking reads as not
        // found rather than as an empty ledger.
        self.repository.get_booking_balance(&mut tx, booking).await?;

        let payments = self.repository.list_payments(&mut tx, booking).await?;

        tx.commit().await?;

        Ok(payments)
    }
}

#[automock]
#[async_trait]
/// Payment ledger operations.
pub trait PaymentsService: Send + Sync {
    /// Records a completed payment against a booking and reconciles the
    /// booking's money summary. The amount must fit the outstanding
    /// balance.
    async fn record_payment(
        &self,
        tenant: TenantUuid,
        booking: BookingUuid,
        payment: NewPayment,
    ) -> Result<Payment, PaymentsServiceError>;

    /// Applies a gateway settlement notice. Replays of an already-applied
    /// `transaction_id` return the stored payment unchanged.
    async fn apply_gateway_event(
        &self,
        tenant: TenantUuid,
        event: GatewayPaymentEvent,
    ) -> Result<Payment, PaymentsServiceError>;

    /// Refunds a completed payment and recomputes the booking standing
    /// from the rows that remain.
    async fn refund_payment(
        &self,
        tenant: TenantUuid,
        payment: PaymentUuid,
    ) -> Result<Payment, PaymentsServiceError>;

    /// Outstanding balance for a booking, floored at zero.
    async fn balance_due(
        &self,
        tenant: TenantUuid,
        booking: BookingUuid,
    ) -> Result<u64, PaymentsServiceError>;

    /// Lists a booking's payment ledger, oldest first.
    async fn list_payments(
        &self,
        tenant: TenantUuid,
        booking: BookingUuid,
    ) -> Result<Vec<Payment>, PaymentsServiceError>;
}
