//! Shared test infrastructure.

mod context;

pub(crate) use context::{SeededRoom, TestContext, future_dates};
pub(crate) use db::TestDb;
