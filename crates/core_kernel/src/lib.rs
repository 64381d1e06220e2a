//! Core Kernel - Foundational types for the invoice ledger
//!
//! This crate provides the building blocks shared by the domain crates:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed identifiers
//! - Clock and storage ports

pub mod identifiers;
pub mod money;
pub mod ports;

pub use identifiers::{
    CustomerId, DiscountLineId, InvoiceId, LineItemId, OrderId, OrderItemId,
    PaymentId, ProductId, TaxLineId,
};
pub use money::{Currency, Money, MoneyError, Rate};
pub use ports::{Clock, FixedClock, PortError, SystemClock};
