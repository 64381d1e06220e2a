//! Test data builders

use chrono::NaiveDate;
use core_kernel::{Clock, Currency, CustomerId, Money};
use domain_invoicing::Invoice;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::fixtures::TemporalFixtures;

/// Builder for invoice aggregates with sensible defaults
///
/// Defaults: one taxable, discount-eligible line (qty 2 × $50.00), USD,
/// invoiced on the fixture date, due a month later, still in Draft.
pub struct InvoiceBuilder {
    invoice_number: String,
    customer_id: CustomerId,
    currency: Currency,
    invoice_date: NaiveDate,
    due_date: NaiveDate,
    lines: Vec<(String, Decimal, Decimal, bool, bool)>,
}

impl Default for InvoiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceBuilder {
    pub fn new() -> Self {
        Self {
            invoice_number: "INV-TEST-0001".to_string(),
            customer_id: CustomerId::new_v7(),
            currency: Currency::USD,
            invoice_date: TemporalFixtures::invoice_date(),
            due_date: TemporalFixtures::due_date(),
            lines: vec![("Widget".to_string(), dec!(2), dec!(50.00), true, true)],
        }
    }

    /// Starts from an invoice with no line items
    pub fn empty() -> Self {
        Self {
            lines: Vec::new(),
            ..Self::new()
        }
    }

    pub fn with_invoice_number(mut self, number: impl Into<String>) -> Self {
        self.invoice_number = number.into();
        self
    }

    pub fn with_customer_id(mut self, id: CustomerId) -> Self {
        self.customer_id = id;
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = due_date;
        self
    }

    /// Adds a line (description, quantity, unit price, taxable, eligible)
    pub fn with_line(
        mut self,
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
        taxable: bool,
        discount_eligible: bool,
    ) -> Self {
        self.lines
            .push((description.into(), quantity, unit_price, taxable, discount_eligible));
        self
    }

    /// Builds the invoice in Draft status
    pub fn build(self, clock: &dyn Clock) -> Invoice {
        let mut invoice = Invoice::new(
            self.invoice_number,
            self.customer_id,
            self.currency,
            self.invoice_date,
            self.due_date,
            clock,
        );
        for (description, quantity, unit_price, taxable, eligible) in self.lines {
            invoice
                .add_item(
                    description,
                    quantity,
                    Money::new(unit_price, self.currency),
                    taxable,
                    eligible,
                    clock,
                )
                .expect("builder line must be valid");
        }
        invoice
    }

    /// Builds and finalizes the invoice (Draft -> Pending)
    pub fn build_pending(self, clock: &dyn Clock) -> Invoice {
        let mut invoice = self.build(clock);
        invoice.finalize(clock).expect("builder invoice must finalize");
        invoice
    }

    /// Builds, finalizes, and sends the invoice
    pub fn build_sent(self, clock: &dyn Clock) -> Invoice {
        let mut invoice = self.build_pending(clock);
        invoice.send(clock).expect("builder invoice must send");
        invoice
    }
}
