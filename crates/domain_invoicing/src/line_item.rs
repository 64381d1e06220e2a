//! Invoice line items
//!
//! A line item belongs to exactly one invoice. Its total price is always
//! derived as quantity × unit price; it is never independently settable, so
//! the stored value cannot drift from its inputs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, LineItemId, Money, OrderItemId, ProductId};

use crate::error::InvoiceError;

/// A single line on an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    id: LineItemId,
    description: String,
    quantity: Decimal,
    unit_price: Money,
    taxable: bool,
    discount_eligible: bool,
    /// Derived: quantity × unit price, rounded to the currency subunit
    total_price: Money,
    /// Catalog product this line was billed from (informational)
    product_id: Option<ProductId>,
    /// Order item this line originated from (informational)
    order_item_id: Option<OrderItemId>,
    created_at: DateTime<Utc>,
}

impl LineItem {
    /// Creates a validated line item
    ///
    /// # Errors
    ///
    /// `InvalidLineItem` when the description is empty, quantity is not
    /// positive, or unit price is negative; `Money` when the unit price
    /// currency does not match the invoice currency.
    pub fn new(
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Money,
        taxable: bool,
        discount_eligible: bool,
        invoice_currency: Currency,
        now: DateTime<Utc>,
    ) -> Result<Self, InvoiceError> {
        let description = description.into();
        validate(&description, quantity, unit_price, invoice_currency)?;

        let mut item = Self {
            id: LineItemId::new_v7(),
            description,
            quantity,
            unit_price,
            taxable,
            discount_eligible,
            total_price: Money::zero(invoice_currency),
            product_id: None,
            order_item_id: None,
            created_at: now,
        };
        item.rederive_total();
        Ok(item)
    }

    /// Links the line to a catalog product
    pub fn with_product(mut self, product_id: ProductId) -> Self {
        self.product_id = Some(product_id);
        self
    }

    /// Links the line to the order item it was billed from
    pub fn with_order_item(mut self, order_item_id: OrderItemId) -> Self {
        self.order_item_id = Some(order_item_id);
        self
    }

    pub fn id(&self) -> LineItemId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn taxable(&self) -> bool {
        self.taxable
    }

    pub fn discount_eligible(&self) -> bool {
        self.discount_eligible
    }

    /// The derived line total
    pub fn total_price(&self) -> Money {
        self.total_price
    }

    pub fn product_id(&self) -> Option<ProductId> {
        self.product_id
    }

    pub fn order_item_id(&self) -> Option<OrderItemId> {
        self.order_item_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Applies a partial update, re-validating the merged result
    ///
    /// The item is untouched when validation fails.
    pub(crate) fn apply_patch(&mut self, patch: LineItemPatch) -> Result<(), InvoiceError> {
        let description = patch.description.unwrap_or_else(|| self.description.clone());
        let quantity = patch.quantity.unwrap_or(self.quantity);
        let unit_price = patch.unit_price.unwrap_or(self.unit_price);
        validate(&description, quantity, unit_price, self.unit_price.currency())?;

        self.description = description;
        self.quantity = quantity;
        self.unit_price = unit_price;
        if let Some(taxable) = patch.taxable {
            self.taxable = taxable;
        }
        if let Some(discount_eligible) = patch.discount_eligible {
            self.discount_eligible = discount_eligible;
        }
        self.rederive_total();
        Ok(())
    }

    fn rederive_total(&mut self) {
        self.total_price = self.unit_price.multiply(self.quantity).round_to_currency();
    }
}

/// Partial update for a line item; absent fields keep their current value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineItemPatch {
    pub description: Option<String>,
    pub quantity: Option<Decimal>,
    pub unit_price: Option<Money>,
    pub taxable: Option<bool>,
    pub discount_eligible: Option<bool>,
}

fn validate(
    description: &str,
    quantity: Decimal,
    unit_price: Money,
    invoice_currency: Currency,
) -> Result<(), InvoiceError> {
    if description.trim().is_empty() {
        return Err(InvoiceError::invalid_line_item("description must not be empty"));
    }
    if quantity <= Decimal::ZERO {
        return Err(InvoiceError::invalid_line_item(format!(
            "quantity must be positive: {quantity}"
        )));
    }
    if unit_price.is_negative() {
        return Err(InvoiceError::invalid_line_item(format!(
            "unit price must not be negative: {unit_price}"
        )));
    }
    if unit_price.currency() != invoice_currency {
        return Err(InvoiceError::Money(core_kernel::MoneyError::CurrencyMismatch(
            invoice_currency.to_string(),
            unit_price.currency().to_string(),
        )));
    }
    Ok(())
}
