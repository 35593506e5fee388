//! Booking Lifecycle

pub mod errors;
pub mod models;
mod number;
mod repository;
pub mod service;

pub use errors::BookingsServiceError;
pub use service::*;
