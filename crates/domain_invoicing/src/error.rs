//! Invoicing domain errors

use core_kernel::{DiscountLineId, LineItemId, MoneyError, TaxLineId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::invoice::InvoiceStatus;

/// Errors that can occur in the invoicing domain
///
/// Every validation error is detected before any field mutation; operations
/// are all-or-nothing and no partial recompute state is observable.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// Bad line item input (quantity, price, or description)
    #[error("Invalid line item: {0}")]
    InvalidLineItem(String),

    /// Tax rate below zero
    #[error("Invalid tax rate: {0}")]
    InvalidRate(Decimal),

    /// Discount value below zero
    #[error("Invalid discount value: {0}")]
    InvalidDiscountValue(Decimal),

    /// Monetary operation failed (currency mismatch)
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Finalize or send attempted with no line items
    #[error("Invoice has no line items")]
    EmptyInvoice,

    /// Lifecycle action not allowed from the current status
    #[error("Invalid status transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: InvoiceStatus,
        to: InvoiceStatus,
    },

    /// Mutation attempted on a terminal (Cancelled or Refunded) invoice
    #[error("Invoice is closed: status {status:?} permits no further mutation")]
    InvoiceClosed { status: InvoiceStatus },

    /// Line item not found
    #[error("Line item not found: {0}")]
    LineItemNotFound(LineItemId),

    /// Tax line not found
    #[error("Tax line not found: {0}")]
    TaxLineNotFound(TaxLineId),

    /// Discount line not found
    #[error("Discount line not found: {0}")]
    DiscountLineNotFound(DiscountLineId),

    /// Other input shape error (e.g., empty cancellation reason)
    #[error("Validation error: {0}")]
    Validation(String),
}

impl InvoiceError {
    pub fn invalid_line_item(message: impl Into<String>) -> Self {
        InvoiceError::InvalidLineItem(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        InvoiceError::Validation(message.into())
    }
}
