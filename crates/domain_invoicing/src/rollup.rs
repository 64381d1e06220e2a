//! Aggregate totals over a set of invoices
//!
//! A pure reduction over already-recomputed invoice fields: it sums what the
//! recompute pipeline produced and derives nothing of its own. Filtering is
//! the caller's concern; this module only folds whatever set it is handed.

use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, MoneyError};

use crate::invoice::{Invoice, InvoiceStatus};

/// Rollup of invoice totals across a filtered set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Number of invoices in the set
    pub count: usize,
    /// Sum of total amounts
    pub total_amount: Money,
    /// Sum of paid amounts
    pub paid_amount: Money,
    /// Sum of outstanding (positive) balances
    pub unpaid_amount: Money,
    /// Sum of outstanding balances on invoices currently Overdue
    pub overdue_amount: Money,
}

impl InvoiceTotals {
    /// An empty rollup in the given currency
    pub fn zero(currency: Currency) -> Self {
        let zero = Money::zero(currency);
        Self {
            count: 0,
            total_amount: zero,
            paid_amount: zero,
            unpaid_amount: zero,
            overdue_amount: zero,
        }
    }
}

/// Sums already-recomputed invoice fields across the given set
///
/// # Errors
///
/// `MoneyError::CurrencyMismatch` when any invoice in the set carries a
/// different currency than the requested rollup currency.
pub fn summarize<'a, I>(invoices: I, currency: Currency) -> Result<InvoiceTotals, MoneyError>
where
    I: IntoIterator<Item = &'a Invoice>,
{
    let mut totals = InvoiceTotals::zero(currency);

    for invoice in invoices {
        totals.count += 1;
        totals.total_amount = totals.total_amount.checked_add(&invoice.total_amount())?;
        totals.paid_amount = totals.paid_amount.checked_add(&invoice.paid_amount())?;

        let balance = invoice.balance_amount();
        if balance.is_positive() {
            totals.unpaid_amount = totals.unpaid_amount.checked_add(&balance)?;
            if invoice.status() == InvoiceStatus::Overdue {
                totals.overdue_amount = totals.overdue_amount.checked_add(&balance)?;
            }
        }
    }

    Ok(totals)
}
