//! Invoicing Domain - Invoice Financial Ledger
//!
//! This crate implements the financial core behind the billing data model:
//! the invoice aggregate that derives and guarantees consistency of an
//! invoice's monetary totals, status, and balance as line items, taxes,
//! discounts, and payments are applied over the invoice's lifetime.
//!
//! # Derived totals
//!
//! Six monetary fields are never set by callers; they are outputs of one
//! recompute pipeline that runs at the end of every mutation:
//!
//! ```text
//! Subtotal       = Σ line item total price
//! DiscountAmount = Σ discount line amounts (clamped to the eligible base)
//! TaxAmount      = Σ tax line amounts (post-discount taxable base)
//! TotalAmount    = Subtotal - DiscountAmount + TaxAmount
//! PaidAmount     = Σ payment amounts
//! BalanceAmount  = TotalAmount - PaidAmount
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_invoicing::Invoice;
//! use core_kernel::{Currency, CustomerId, SystemClock};
//!
//! let clock = SystemClock;
//! let mut invoice = Invoice::new("INV-1001", CustomerId::new_v7(), Currency::USD,
//!                                invoice_date, due_date, &clock);
//! invoice.add_item("Widget", dec!(2), Money::new(dec!(50), Currency::USD),
//!                  true, true, &clock)?;
//! invoice.finalize(&clock)?;
//! ```

pub mod adjustment;
pub mod error;
pub mod invoice;
pub mod line_item;
pub mod payment;
pub mod ports;
pub mod rollup;

pub use adjustment::{DiscountLine, DiscountType, TaxLine};
pub use error::InvoiceError;
pub use invoice::{Invoice, InvoiceStatus};
pub use line_item::{LineItem, LineItemPatch};
pub use payment::{Payment, PaymentMethod};
pub use ports::InvoiceRepository;
pub use rollup::{summarize, InvoiceTotals};
