//! Payments service errors.

use std::num::TryFromIntError;

use parador::{reconcile::PaymentAmountError, status::PaymentState};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

/// SQLSTATEs for serialization failure and deadlock. The update lost a
/// race and may be retried as a whole.
const CONFLICT_SQLSTATES: [&str; 2] = ["40001", "40P01"];

#[derive(Debug, Error)]
pub enum PaymentsServiceError {
    #[error("invalid payment amount")]
    InvalidAmount(#[from] PaymentAmountError),

    #[error("only completed payments can be refunded; this one is {state}")]
    NotCompleted {
        /// State the payment was found in.
        state: PaymentState,
    },

    #[error("payment lost a concurrent update race; safe to retry")]
    ConcurrencyConflict,

    #[error("payment already exists")]
    AlreadyExists,

    #[error("payment or booking not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),

    #[error("invalid amount value")]
    AmountOutOfRange(#[from] TryFromIntError),
}

impl From<Error> for PaymentsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        if let Some(code) = error.as_database_error().and_then(DatabaseError::code) {
            if CONFLICT_SQLSTATES.contains(&code.as_ref()) {
                return Self::ConcurrencyConflict;
            }
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
