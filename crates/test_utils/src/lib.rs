//! Shared test utilities for the invoice ledger test suite
//!
//! Provides fixtures with sensible defaults and a builder for constructing
//! invoice aggregates, so tests specify only the fields they care about.

pub mod builders;
pub mod fixtures;

pub use builders::InvoiceBuilder;
pub use fixtures::{MoneyFixtures, TemporalFixtures};
