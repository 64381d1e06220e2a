//! Payments
//!
//! Payments are append-only facts within an invoice's lifetime. Reversal
//! policy lives at the invoice level (refund of a fully paid invoice); an
//! individual payment is never edited or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Money, PaymentId};

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Check,
    CreditCard,
    DebitCard,
    BankTransfer,
    PayPal,
    Cryptocurrency,
    Other,
}

/// A payment recorded against an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    id: PaymentId,
    method: PaymentMethod,
    amount: Money,
    payment_date: DateTime<Utc>,
    /// External reference (bank ref, transaction id)
    reference: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl Payment {
    pub(crate) fn new(
        method: PaymentMethod,
        amount: Money,
        payment_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PaymentId::new_v7(),
            method,
            amount,
            payment_date,
            reference: None,
            notes: None,
            created_at: now,
        }
    }

    /// Sets the external reference
    pub(crate) fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Sets free-text notes
    pub(crate) fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn id(&self) -> PaymentId {
        self.id
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn payment_date(&self) -> DateTime<Utc> {
        self.payment_date
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
