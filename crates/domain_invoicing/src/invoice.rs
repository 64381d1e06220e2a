//! Invoice Aggregate Root
//!
//! The Invoice aggregate is the consistency boundary of the ledger. It owns
//! the line items, tax and discount lines, and payments, and it re-derives
//! the six monetary totals through one explicit recompute pipeline at the end
//! of every public mutation, never through hidden observer wiring.
//!
//! # Invariants
//!
//! - All monetary fields on one invoice share one currency
//! - The six derived fields always agree with the owned collections
//! - Terminal states (Cancelled, Refunded) permit no further mutation
//! - Validation happens before any field mutation; operations are
//!   all-or-nothing
//!
//! # State Machine
//!
//! Valid transitions:
//! - Draft -> Pending (via finalize, requires at least one line item)
//! - Draft/Pending -> Sent (via send)
//! - Pending/Sent -> PartialPaid (automatic, 0 < paid < total)
//! - Pending/Sent/PartialPaid/Overdue -> Paid (automatic, paid >= total)
//! - Pending/Sent/PartialPaid -> Overdue (automatic, past due with balance)
//! - any non-terminal except Paid -> Cancelled (via cancel)
//! - Paid -> Refunded (via refund)

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{
    Clock, Currency, CustomerId, DiscountLineId, InvoiceId, LineItemId, Money, OrderId, PaymentId,
    Rate, TaxLineId,
};

use crate::adjustment::{self, DiscountLine, DiscountType, TaxLine};
use crate::error::InvoiceError;
use crate::line_item::{LineItem, LineItemPatch};
use crate::payment::{Payment, PaymentMethod};

/// Invoice lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceStatus {
    /// Being drafted; totals recompute but no automatic transitions apply
    Draft,
    /// Finalized and awaiting dispatch
    Pending,
    /// Sent to the customer
    Sent,
    /// Fully paid
    Paid,
    /// Partial payment received
    PartialPaid,
    /// Past due date with an outstanding balance
    Overdue,
    /// Cancelled (terminal)
    Cancelled,
    /// Refunded after full payment (terminal)
    Refunded,
}

impl InvoiceStatus {
    /// Terminal states permit no further mutation
    pub fn is_terminal(&self) -> bool {
        matches!(self, InvoiceStatus::Cancelled | InvoiceStatus::Refunded)
    }
}

/// The invoice aggregate root
///
/// The six derived monetary fields are never set by callers; they are
/// outputs of [`recompute`](Invoice::touch) and always agree with the owned
/// collections before control returns from a mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    // Immutable identity
    id: InvoiceId,
    invoice_number: String,
    customer_id: CustomerId,
    order_id: Option<OrderId>,
    currency: Currency,

    // Lifecycle
    status: InvoiceStatus,
    invoice_date: NaiveDate,
    due_date: NaiveDate,
    sent_at: Option<DateTime<Utc>>,
    paid_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    cancellation_reason: Option<String>,

    // Owned child collections
    items: Vec<LineItem>,
    taxes: Vec<TaxLine>,
    discounts: Vec<DiscountLine>,
    payments: Vec<Payment>,

    // Derived totals (outputs of recompute)
    subtotal: Money,
    discount_amount: Money,
    tax_amount: Money,
    total_amount: Money,
    paid_amount: Money,
    balance_amount: Money,

    // Free text
    terms: Option<String>,
    notes: Option<String>,
    internal_notes: Option<String>,
    billing_address: Option<String>,
    shipping_address: Option<String>,

    /// Version for optimistic concurrency
    version: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Creates a new draft invoice with zero totals
    pub fn new(
        invoice_number: impl Into<String>,
        customer_id: CustomerId,
        currency: Currency,
        invoice_date: NaiveDate,
        due_date: NaiveDate,
        clock: &dyn Clock,
    ) -> Self {
        let now = clock.now();
        let zero = Money::zero(currency);

        Self {
            id: InvoiceId::new_v7(),
            invoice_number: invoice_number.into(),
            customer_id,
            order_id: None,
            currency,
            status: InvoiceStatus::Draft,
            invoice_date,
            due_date,
            sent_at: None,
            paid_at: None,
            cancelled_at: None,
            cancellation_reason: None,
            items: Vec::new(),
            taxes: Vec::new(),
            discounts: Vec::new(),
            payments: Vec::new(),
            subtotal: zero,
            discount_amount: zero,
            tax_amount: zero,
            total_amount: zero,
            paid_amount: zero,
            balance_amount: zero,
            terms: None,
            notes: None,
            internal_notes: None,
            billing_address: None,
            shipping_address: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Links the invoice to the order it bills
    pub fn with_order(mut self, order_id: OrderId) -> Self {
        self.order_id = Some(order_id);
        self
    }

    /// Sets the payment terms text
    pub fn with_terms(mut self, terms: impl Into<String>) -> Self {
        self.terms = Some(terms.into());
        self
    }

    /// Sets customer-visible notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Sets internal notes
    pub fn with_internal_notes(mut self, notes: impl Into<String>) -> Self {
        self.internal_notes = Some(notes.into());
        self
    }

    /// Sets the billing address
    pub fn with_billing_address(mut self, address: impl Into<String>) -> Self {
        self.billing_address = Some(address.into());
        self
    }

    /// Sets the shipping address
    pub fn with_shipping_address(mut self, address: impl Into<String>) -> Self {
        self.shipping_address = Some(address.into());
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn id(&self) -> InvoiceId {
        self.id
    }

    pub fn invoice_number(&self) -> &str {
        &self.invoice_number
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn order_id(&self) -> Option<OrderId> {
        self.order_id
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn invoice_date(&self) -> NaiveDate {
        self.invoice_date
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.sent_at
    }

    pub fn paid_at(&self) -> Option<DateTime<Utc>> {
        self.paid_at
    }

    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
    }

    pub fn cancellation_reason(&self) -> Option<&str> {
        self.cancellation_reason.as_deref()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn taxes(&self) -> &[TaxLine] {
        &self.taxes
    }

    pub fn discounts(&self) -> &[DiscountLine] {
        &self.discounts
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn discount_amount(&self) -> Money {
        self.discount_amount
    }

    pub fn tax_amount(&self) -> Money {
        self.tax_amount
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn paid_amount(&self) -> Money {
        self.paid_amount
    }

    /// May be negative on overpayment; surfaced, never auto-refunded
    pub fn balance_amount(&self) -> Money {
        self.balance_amount
    }

    pub fn terms(&self) -> Option<&str> {
        self.terms.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn internal_notes(&self) -> Option<&str> {
        self.internal_notes.as_deref()
    }

    pub fn billing_address(&self) -> Option<&str> {
        self.billing_address.as_deref()
    }

    pub fn shipping_address(&self) -> Option<&str> {
        self.shipping_address.as_deref()
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // ------------------------------------------------------------------
    // Line items
    // ------------------------------------------------------------------

    /// Adds a line item and recomputes totals
    ///
    /// # Errors
    ///
    /// `InvoiceClosed` in a terminal state; `InvalidLineItem` for an empty
    /// description, non-positive quantity, or negative unit price; `Money`
    /// when the unit price currency differs from the invoice currency.
    pub fn add_item(
        &mut self,
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Money,
        taxable: bool,
        discount_eligible: bool,
        clock: &dyn Clock,
    ) -> Result<LineItemId, InvoiceError> {
        self.ensure_open()?;
        let now = clock.now();
        let item = LineItem::new(
            description,
            quantity,
            unit_price,
            taxable,
            discount_eligible,
            self.currency,
            now,
        )?;
        let id = item.id();
        self.items.push(item);
        self.commit_mutation(now);
        Ok(id)
    }

    /// Applies a partial update to a line item and recomputes totals
    pub fn update_item(
        &mut self,
        id: LineItemId,
        patch: LineItemPatch,
        clock: &dyn Clock,
    ) -> Result<(), InvoiceError> {
        self.ensure_open()?;
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or(InvoiceError::LineItemNotFound(id))?;
        item.apply_patch(patch)?;
        self.commit_mutation(clock.now());
        Ok(())
    }

    /// Removes a line item and recomputes totals
    pub fn remove_item(&mut self, id: LineItemId, clock: &dyn Clock) -> Result<(), InvoiceError> {
        self.ensure_open()?;
        let index = self
            .items
            .iter()
            .position(|item| item.id() == id)
            .ok_or(InvoiceError::LineItemNotFound(id))?;
        self.items.remove(index);
        self.commit_mutation(clock.now());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Taxes and discounts
    // ------------------------------------------------------------------

    /// Applies a tax line; the rate is a fraction (0.08 for 8%)
    ///
    /// # Errors
    ///
    /// `InvalidRate` when the rate is negative; `InvoiceClosed` in a
    /// terminal state.
    pub fn apply_tax(
        &mut self,
        tax_type: impl Into<String>,
        rate: Decimal,
        description: Option<String>,
        clock: &dyn Clock,
    ) -> Result<TaxLineId, InvoiceError> {
        self.ensure_open()?;
        let rate = Rate::new(rate).map_err(|_| InvoiceError::InvalidRate(rate))?;
        let now = clock.now();
        let line = TaxLine::new(tax_type, rate, description, self.currency, now);
        let id = line.id();
        self.taxes.push(line);
        self.commit_mutation(now);
        Ok(id)
    }

    /// Removes a tax line and recomputes totals
    pub fn remove_tax(&mut self, id: TaxLineId, clock: &dyn Clock) -> Result<(), InvoiceError> {
        self.ensure_open()?;
        let index = self
            .taxes
            .iter()
            .position(|line| line.id() == id)
            .ok_or(InvoiceError::TaxLineNotFound(id))?;
        self.taxes.remove(index);
        self.commit_mutation(clock.now());
        Ok(())
    }

    /// Applies a discount line
    ///
    /// For `Percentage` the value is the percentage (10 for 10%); for
    /// `FixedAmount` and `BuyXGetY` it is the amount, the latter supplied by
    /// the external pricing collaborator. The computed amount clamps to the
    /// eligible base; an over-large discount is never an error.
    pub fn apply_discount(
        &mut self,
        discount_type: DiscountType,
        value: Decimal,
        description: Option<String>,
        coupon_code: Option<String>,
        clock: &dyn Clock,
    ) -> Result<DiscountLineId, InvoiceError> {
        self.ensure_open()?;
        if value.is_sign_negative() {
            return Err(InvoiceError::InvalidDiscountValue(value));
        }
        let now = clock.now();
        let line = DiscountLine::new(
            discount_type,
            value,
            description,
            coupon_code,
            self.currency,
            now,
        );
        let id = line.id();
        self.discounts.push(line);
        self.commit_mutation(now);
        Ok(id)
    }

    /// Removes a discount line and recomputes totals
    pub fn remove_discount(
        &mut self,
        id: DiscountLineId,
        clock: &dyn Clock,
    ) -> Result<(), InvoiceError> {
        self.ensure_open()?;
        let index = self
            .discounts
            .iter()
            .position(|line| line.id() == id)
            .ok_or(InvoiceError::DiscountLineNotFound(id))?;
        self.discounts.remove(index);
        self.commit_mutation(clock.now());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Payments
    // ------------------------------------------------------------------

    /// Records a payment and re-evaluates paid/balance amounts and status
    ///
    /// Payments are append-only. Overpayment is allowed: the balance goes
    /// negative and is surfaced, never auto-refunded.
    pub fn record_payment(
        &mut self,
        method: PaymentMethod,
        amount: Money,
        payment_date: DateTime<Utc>,
        reference: Option<String>,
        notes: Option<String>,
        clock: &dyn Clock,
    ) -> Result<PaymentId, InvoiceError> {
        self.ensure_open()?;
        if amount.currency() != self.currency {
            return Err(InvoiceError::Money(core_kernel::MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                amount.currency().to_string(),
            )));
        }
        if !amount.is_positive() {
            return Err(InvoiceError::validation(format!(
                "payment amount must be positive: {amount}"
            )));
        }

        let now = clock.now();
        let mut payment = Payment::new(method, amount, payment_date, now);
        if let Some(reference) = reference {
            payment = payment.with_reference(reference);
        }
        if let Some(notes) = notes {
            payment = payment.with_notes(notes);
        }
        let id = payment.id();
        self.payments.push(payment);
        self.commit_mutation(now);
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Lifecycle actions
    // ------------------------------------------------------------------

    /// Finalizes a draft (Draft -> Pending)
    ///
    /// # Errors
    ///
    /// `EmptyInvoice` when no line items exist; `InvalidTransition` when not
    /// in Draft.
    pub fn finalize(&mut self, clock: &dyn Clock) -> Result<(), InvoiceError> {
        if self.status != InvoiceStatus::Draft {
            return Err(InvoiceError::InvalidTransition {
                from: self.status,
                to: InvoiceStatus::Pending,
            });
        }
        if self.items.is_empty() {
            return Err(InvoiceError::EmptyInvoice);
        }
        self.status = InvoiceStatus::Pending;
        self.commit_mutation(clock.now());
        Ok(())
    }

    /// Sends the invoice (Draft/Pending -> Sent), stamping sent_at
    ///
    /// Sending a draft implies finalizing it, so the same non-empty rule
    /// applies.
    pub fn send(&mut self, clock: &dyn Clock) -> Result<(), InvoiceError> {
        if !matches!(self.status, InvoiceStatus::Draft | InvoiceStatus::Pending) {
            return Err(InvoiceError::InvalidTransition {
                from: self.status,
                to: InvoiceStatus::Sent,
            });
        }
        if self.items.is_empty() {
            return Err(InvoiceError::EmptyInvoice);
        }
        let now = clock.now();
        self.status = InvoiceStatus::Sent;
        self.sent_at = Some(now);
        self.commit_mutation(now);
        Ok(())
    }

    /// Cancels the invoice with a reason, stamping cancelled_at
    ///
    /// # Errors
    ///
    /// `InvalidTransition` when the invoice is Paid or already terminal;
    /// `Validation` for an empty reason.
    pub fn cancel(&mut self, reason: impl Into<String>, clock: &dyn Clock) -> Result<(), InvoiceError> {
        if matches!(
            self.status,
            InvoiceStatus::Paid | InvoiceStatus::Cancelled | InvoiceStatus::Refunded
        ) {
            return Err(InvoiceError::InvalidTransition {
                from: self.status,
                to: InvoiceStatus::Cancelled,
            });
        }
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(InvoiceError::validation("cancellation reason must not be empty"));
        }
        let now = clock.now();
        self.status = InvoiceStatus::Cancelled;
        self.cancelled_at = Some(now);
        self.cancellation_reason = Some(reason);
        self.commit_mutation(now);
        Ok(())
    }

    /// Refunds a fully paid invoice (Paid -> Refunded)
    pub fn refund(&mut self, clock: &dyn Clock) -> Result<(), InvoiceError> {
        if self.status != InvoiceStatus::Paid {
            return Err(InvoiceError::InvalidTransition {
                from: self.status,
                to: InvoiceStatus::Refunded,
            });
        }
        self.status = InvoiceStatus::Refunded;
        self.commit_mutation(clock.now());
        Ok(())
    }

    /// Re-runs the recompute pipeline without changing any input
    ///
    /// Drives time-derived evaluation: a Sent invoice past its due date with
    /// an outstanding balance moves to Overdue on the next touch. Allowed in
    /// any state; terminal invoices never transition automatically.
    pub fn touch(&mut self, clock: &dyn Clock) {
        self.commit_mutation(clock.now());
    }

    // ------------------------------------------------------------------
    // Recompute pipeline
    // ------------------------------------------------------------------

    fn ensure_open(&self) -> Result<(), InvoiceError> {
        if self.status.is_terminal() {
            return Err(InvoiceError::InvoiceClosed {
                status: self.status,
            });
        }
        Ok(())
    }

    fn commit_mutation(&mut self, now: DateTime<Utc>) {
        self.recompute(now);
        self.updated_at = now;
        self.version += 1;
    }

    /// The single choke point every mutation funnels through
    ///
    /// Idempotent and total: a fixed five-step derivation with no recursion.
    fn recompute(&mut self, now: DateTime<Utc>) {
        let zero = Money::zero(self.currency);

        // 1. Subtotal over all line items.
        self.subtotal = self
            .items
            .iter()
            .fold(zero, |acc, item| acc + item.total_price());

        // 2. Discounts: each line computes on the same eligible base
        //    (additive stacking), and the sum clamps to that base.
        let eligible = adjustment::discount_base(&self.items, self.currency);
        for line in &mut self.discounts {
            line.recompute(eligible);
        }
        let discount_sum = self
            .discounts
            .iter()
            .fold(zero, |acc, line| acc + line.amount());
        self.discount_amount = discount_sum.min(&eligible).unwrap_or(eligible);

        // 3. Taxes on the post-discount taxable base.
        let tax_base = adjustment::taxable_base(&self.items, self.discount_amount, self.currency);
        for line in &mut self.taxes {
            line.recompute(tax_base);
        }
        self.tax_amount = self
            .taxes
            .iter()
            .fold(zero, |acc, line| acc + line.amount());

        // 4. Total.
        self.total_amount =
            (self.subtotal - self.discount_amount + self.tax_amount).round_to_currency();

        // 5. Paid and balance.
        self.paid_amount = self
            .payments
            .iter()
            .fold(zero, |acc, payment| acc + payment.amount())
            .round_to_currency();
        self.balance_amount = (self.total_amount - self.paid_amount).round_to_currency();

        self.evaluate_status(now);
    }

    /// Automatic status transitions driven by the recomputed amounts
    ///
    /// Only Pending, Sent, PartialPaid, and Overdue participate: Draft waits
    /// for an explicit finalize/send, and Paid/Cancelled/Refunded never move
    /// automatically. Overdue is re-evaluatable but only the paid-amount
    /// transitions leave it, never a date moving backwards.
    fn evaluate_status(&mut self, now: DateTime<Utc>) {
        match self.status {
            InvoiceStatus::Pending
            | InvoiceStatus::Sent
            | InvoiceStatus::PartialPaid
            | InvoiceStatus::Overdue => {}
            _ => return,
        }

        let paid = self.paid_amount.amount();
        let total = self.total_amount.amount();

        if paid >= total && (paid > Decimal::ZERO || total > Decimal::ZERO) {
            self.status = InvoiceStatus::Paid;
            self.paid_at = Some(now);
        } else if now.date_naive() > self.due_date && self.balance_amount.is_positive() {
            self.status = InvoiceStatus::Overdue;
        } else if paid > Decimal::ZERO && paid < total {
            self.status = InvoiceStatus::PartialPaid;
        }
    }
}
