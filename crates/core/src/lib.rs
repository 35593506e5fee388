//! # Parador
//!
//! Pure domain engine for a multi-tenant hotel booking platform: the
//! booking lifecycle state machine, stay interval arithmetic, pricing, and
//! the payment reconciliation rules. Everything here is synchronous and
//! storage-free; persistence and orchestration live in `parador-app`.

pub mod pricing;
pub mod reconcile;
pub mod status;
pub mod stay;
pub mod transition;
