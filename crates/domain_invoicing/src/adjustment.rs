//! Taxes and discounts
//!
//! Adjustment lines hold their inputs (rate, value, type); their computed
//! amounts are outputs of the invoice recompute pipeline. Discounts are
//! applied pre-tax: the taxable base is reduced by the share of the total
//! discount attributable to taxable items, attributed proportionally by each
//! item's share of the discount-eligible subtotal.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, DiscountLineId, Money, Rate, TaxLineId};

use crate::line_item::LineItem;

/// A tax line on an invoice
///
/// Multiple tax lines may coexist (e.g., state + local); they stack
/// additively on the same post-discount taxable base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxLine {
    id: TaxLineId,
    /// Free-form classifier (e.g., "state", "local", "VAT")
    tax_type: String,
    rate: Rate,
    description: Option<String>,
    /// Derived: the post-discount taxable base this line was computed on
    taxable_amount: Money,
    /// Derived: taxable amount × rate
    amount: Money,
    created_at: DateTime<Utc>,
}

impl TaxLine {
    pub(crate) fn new(
        tax_type: impl Into<String>,
        rate: Rate,
        description: Option<String>,
        currency: Currency,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TaxLineId::new_v7(),
            tax_type: tax_type.into(),
            rate,
            description,
            taxable_amount: Money::zero(currency),
            amount: Money::zero(currency),
            created_at: now,
        }
    }

    pub fn id(&self) -> TaxLineId {
        self.id
    }

    pub fn tax_type(&self) -> &str {
        &self.tax_type
    }

    pub fn rate(&self) -> Rate {
        self.rate
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn taxable_amount(&self) -> Money {
        self.taxable_amount
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Re-derives this line's amount from the given taxable base
    pub(crate) fn recompute(&mut self, base: Money) {
        self.taxable_amount = base;
        self.amount = self.rate.apply(&base).round_to_currency();
    }
}

/// Discount computation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscountType {
    /// Percentage of the eligible subtotal (value is the percentage)
    Percentage,
    /// Fixed amount off the eligible subtotal (value is the amount)
    FixedAmount,
    /// Promotional bundle priced by an external pricing collaborator;
    /// the value is the externally supplied amount, recorded as-is
    BuyXGetY,
}

/// A discount line on an invoice
///
/// Multiple discounts stack additively on the same eligible base, never
/// compounded. An over-large discount clamps to the base; it never errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountLine {
    id: DiscountLineId,
    discount_type: DiscountType,
    /// Percentage, fixed amount, or externally priced amount per type
    value: Decimal,
    description: Option<String>,
    coupon_code: Option<String>,
    /// Derived: the clamped amount this line contributes
    amount: Money,
    created_at: DateTime<Utc>,
}

impl DiscountLine {
    pub(crate) fn new(
        discount_type: DiscountType,
        value: Decimal,
        description: Option<String>,
        coupon_code: Option<String>,
        currency: Currency,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: DiscountLineId::new_v7(),
            discount_type,
            value,
            description,
            coupon_code,
            amount: Money::zero(currency),
            created_at: now,
        }
    }

    pub fn id(&self) -> DiscountLineId {
        self.id
    }

    pub fn discount_type(&self) -> DiscountType {
        self.discount_type
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon_code.as_deref()
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Re-derives this line's amount from the given eligible base
    pub(crate) fn recompute(&mut self, base: Money) {
        let raw = match self.discount_type {
            DiscountType::Percentage => base.multiply(self.value / dec!(100)),
            DiscountType::FixedAmount | DiscountType::BuyXGetY => {
                Money::new(self.value, base.currency())
            }
        };
        // Clamp: a discount can never exceed what it discounts.
        let clamped = raw.min(&base).unwrap_or(base);
        self.amount = clamped.round_to_currency();
    }
}

/// Subtotal of items flagged discount-eligible
pub fn discount_base(items: &[LineItem], currency: Currency) -> Money {
    items
        .iter()
        .filter(|item| item.discount_eligible())
        .fold(Money::zero(currency), |acc, item| acc + item.total_price())
}

/// Post-discount taxable base
///
/// Items flagged taxable form the gross base. The total discount is
/// attributed to taxable items proportionally by their share of the
/// discount-eligible subtotal, and the base is floored at zero.
pub fn taxable_base(items: &[LineItem], total_discount: Money, currency: Currency) -> Money {
    let zero = Money::zero(currency);
    let gross = items
        .iter()
        .filter(|item| item.taxable())
        .fold(zero, |acc, item| acc + item.total_price());

    let eligible = discount_base(items, currency);
    if eligible.is_zero() || total_discount.is_zero() {
        return gross;
    }

    let taxable_eligible = items
        .iter()
        .filter(|item| item.taxable() && item.discount_eligible())
        .fold(zero, |acc, item| acc + item.total_price());

    let attributed = total_discount.multiply(taxable_eligible.amount() / eligible.amount());
    let base = gross - attributed;
    if base.is_negative() {
        zero
    } else {
        base
    }
}
