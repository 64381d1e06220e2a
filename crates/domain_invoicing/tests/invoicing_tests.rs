//! Comprehensive tests for domain_invoicing

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Clock, Currency, Money};
use domain_invoicing::{DiscountType, InvoiceError, InvoiceStatus, LineItemPatch, PaymentMethod};
use test_utils::{InvoiceBuilder, MoneyFixtures, TemporalFixtures};

fn usd(amount: Decimal) -> Money {
    MoneyFixtures::usd(amount)
}

// ============================================================================
// Billing scenarios
// ============================================================================

mod scenario_tests {
    use super::*;

    // One item (qty 2 × $50.00, taxable, discount-eligible), 10% discount,
    // 8% tax on the post-discount base.
    fn discounted_taxed_invoice() -> domain_invoicing::Invoice {
        let clock = TemporalFixtures::clock();
        let mut invoice = InvoiceBuilder::new().build_pending(&clock);
        invoice
            .apply_discount(DiscountType::Percentage, dec!(10), None, None, &clock)
            .unwrap();
        invoice.apply_tax("state", dec!(0.08), None, &clock).unwrap();
        invoice
    }

    #[test]
    fn discount_then_tax_derives_totals() {
        let invoice = discounted_taxed_invoice();

        assert_eq!(invoice.subtotal().amount(), dec!(100.00));
        assert_eq!(invoice.discount_amount().amount(), dec!(10.00));
        assert_eq!(invoice.tax_amount().amount(), dec!(7.20));
        assert_eq!(invoice.total_amount().amount(), dec!(97.20));
        assert_eq!(invoice.balance_amount().amount(), dec!(97.20));

        // The tax line records the post-discount base it was computed on.
        assert_eq!(invoice.taxes()[0].taxable_amount().amount(), dec!(90.00));
    }

    #[test]
    fn full_payment_marks_paid() {
        let clock = TemporalFixtures::clock();
        let mut invoice = discounted_taxed_invoice();

        invoice
            .record_payment(
                PaymentMethod::BankTransfer,
                usd(dec!(97.20)),
                TemporalFixtures::now(),
                Some("WIRE-881".to_string()),
                None,
                &clock,
            )
            .unwrap();

        assert_eq!(invoice.paid_amount().amount(), dec!(97.20));
        assert!(invoice.balance_amount().is_zero());
        assert_eq!(invoice.status(), InvoiceStatus::Paid);
        assert_eq!(invoice.paid_at(), Some(TemporalFixtures::now()));
    }

    #[test]
    fn partial_payment_leaves_balance() {
        let clock = TemporalFixtures::clock();
        let mut invoice = discounted_taxed_invoice();

        invoice
            .record_payment(
                PaymentMethod::Cash,
                usd(dec!(50.00)),
                TemporalFixtures::now(),
                None,
                None,
                &clock,
            )
            .unwrap();

        assert_eq!(invoice.balance_amount().amount(), dec!(47.20));
        assert_eq!(invoice.status(), InvoiceStatus::PartialPaid);
        assert!(invoice.paid_at().is_none());
    }

    #[test]
    fn past_due_invoice_goes_overdue_on_touch() {
        let clock = TemporalFixtures::clock();
        let mut invoice = InvoiceBuilder::new()
            .with_due_date(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap())
            .build_sent(&clock);
        assert_eq!(invoice.status(), InvoiceStatus::Sent);

        invoice.touch(&TemporalFixtures::late_clock());
        assert_eq!(invoice.status(), InvoiceStatus::Overdue);

        // Dates alone never reverse Overdue.
        invoice.touch(&TemporalFixtures::late_clock());
        assert_eq!(invoice.status(), InvoiceStatus::Overdue);

        // Paying the balance does.
        invoice
            .record_payment(
                PaymentMethod::CreditCard,
                usd(dec!(100.00)),
                TemporalFixtures::late_clock().now(),
                None,
                None,
                &TemporalFixtures::late_clock(),
            )
            .unwrap();
        assert_eq!(invoice.status(), InvoiceStatus::Paid);
    }

    #[test]
    fn mixed_taxability_attributes_discount_proportionally() {
        // Eligible subtotal $2000: taxable $1200 + exempt $800.
        // 10% discount = $200; $120 attributed to the taxable share.
        // 5% tax on $1080 = $54. Total = 2000 - 200 + 54 = 1854.
        let clock = TemporalFixtures::clock();
        let mut invoice = InvoiceBuilder::empty()
            .with_line("Hardware", dec!(1), dec!(1200), true, true)
            .with_line("Services", dec!(1), dec!(800), false, true)
            .build_pending(&clock);
        invoice
            .apply_discount(DiscountType::Percentage, dec!(10), None, None, &clock)
            .unwrap();
        invoice.apply_tax("state", dec!(0.05), None, &clock).unwrap();

        assert_eq!(invoice.subtotal().amount(), dec!(2000.00));
        assert_eq!(invoice.discount_amount().amount(), dec!(200.00));
        assert_eq!(invoice.tax_amount().amount(), dec!(54.00));
        assert_eq!(invoice.total_amount().amount(), dec!(1854.00));
    }

    #[test]
    fn multiple_taxes_stack_additively() {
        let clock = TemporalFixtures::clock();
        let mut invoice = InvoiceBuilder::new().build_pending(&clock);
        invoice.apply_tax("state", dec!(0.06), None, &clock).unwrap();
        invoice.apply_tax("local", dec!(0.02), None, &clock).unwrap();

        // Both on the same $100 base, not nested.
        assert_eq!(invoice.tax_amount().amount(), dec!(8.00));
        assert_eq!(invoice.total_amount().amount(), dec!(108.00));
    }

    #[test]
    fn multiple_discounts_stack_on_the_same_base() {
        let clock = TemporalFixtures::clock();
        let mut invoice = InvoiceBuilder::new().build_pending(&clock);
        invoice
            .apply_discount(DiscountType::Percentage, dec!(10), None, None, &clock)
            .unwrap();
        invoice
            .apply_discount(
                DiscountType::FixedAmount,
                dec!(5),
                None,
                Some("SAVE5".to_string()),
                &clock,
            )
            .unwrap();

        // 10% of 100 plus 5, both against the same base.
        assert_eq!(invoice.discount_amount().amount(), dec!(15.00));
        assert_eq!(invoice.total_amount().amount(), dec!(85.00));
    }

    #[test]
    fn buy_x_get_y_records_external_amount() {
        let clock = TemporalFixtures::clock();
        let mut invoice = InvoiceBuilder::new().build_pending(&clock);
        invoice
            .apply_discount(
                DiscountType::BuyXGetY,
                dec!(25.00),
                Some("Buy 2 get 1 free".to_string()),
                None,
                &clock,
            )
            .unwrap();

        assert_eq!(invoice.discount_amount().amount(), dec!(25.00));
        assert_eq!(invoice.total_amount().amount(), dec!(75.00));
    }
}

// ============================================================================
// Invariants
// ============================================================================

mod invariant_tests {
    use super::*;

    #[test]
    fn oversized_discount_clamps_to_eligible_base() {
        let clock = TemporalFixtures::clock();
        let mut invoice = InvoiceBuilder::new().build_pending(&clock);
        invoice
            .apply_discount(DiscountType::Percentage, dec!(150), None, None, &clock)
            .unwrap();

        assert_eq!(invoice.discount_amount().amount(), dec!(100.00));
        assert!(invoice.total_amount().is_zero());
        assert!(!invoice.total_amount().is_negative());
    }

    #[test]
    fn stacked_discounts_clamp_to_eligible_base() {
        let clock = TemporalFixtures::clock();
        let mut invoice = InvoiceBuilder::new().build_pending(&clock);
        invoice
            .apply_discount(DiscountType::Percentage, dec!(80), None, None, &clock)
            .unwrap();
        invoice
            .apply_discount(DiscountType::Percentage, dec!(80), None, None, &clock)
            .unwrap();

        assert_eq!(invoice.discount_amount().amount(), dec!(100.00));
        assert!(invoice.total_amount().is_zero());
    }

    #[test]
    fn discount_ignores_ineligible_items() {
        let clock = TemporalFixtures::clock();
        let mut invoice = InvoiceBuilder::new()
            .with_line("Shipping", dec!(1), dec!(20), true, false)
            .build_pending(&clock);
        invoice
            .apply_discount(DiscountType::Percentage, dec!(50), None, None, &clock)
            .unwrap();

        // 50% of the $100 eligible base; the $20 line still counts in subtotal.
        assert_eq!(invoice.subtotal().amount(), dec!(120.00));
        assert_eq!(invoice.discount_amount().amount(), dec!(50.00));
    }

    #[test]
    fn subtotal_follows_item_mutations() {
        let clock = TemporalFixtures::clock();
        let mut invoice = InvoiceBuilder::empty().build(&clock);

        let first = invoice
            .add_item("A", dec!(2), usd(dec!(10)), true, true, &clock)
            .unwrap();
        let second = invoice
            .add_item("B", dec!(1), usd(dec!(5.50)), true, true, &clock)
            .unwrap();
        assert_eq!(invoice.subtotal().amount(), dec!(25.50));

        invoice
            .update_item(
                first,
                LineItemPatch {
                    quantity: Some(dec!(3)),
                    ..Default::default()
                },
                &clock,
            )
            .unwrap();
        assert_eq!(invoice.subtotal().amount(), dec!(35.50));

        invoice.remove_item(second, &clock).unwrap();
        assert_eq!(invoice.subtotal().amount(), dec!(30.00));

        let expected: Decimal = invoice
            .items()
            .iter()
            .map(|item| item.total_price().amount())
            .sum();
        assert_eq!(invoice.subtotal().amount(), expected);
    }

    #[test]
    fn removing_adjustments_restores_totals() {
        let clock = TemporalFixtures::clock();
        let mut invoice = InvoiceBuilder::new().build_pending(&clock);
        let discount = invoice
            .apply_discount(DiscountType::Percentage, dec!(10), None, None, &clock)
            .unwrap();
        let tax = invoice.apply_tax("state", dec!(0.08), None, &clock).unwrap();
        assert_eq!(invoice.total_amount().amount(), dec!(97.20));

        invoice.remove_tax(tax, &clock).unwrap();
        assert_eq!(invoice.total_amount().amount(), dec!(90.00));

        invoice.remove_discount(discount, &clock).unwrap();
        assert_eq!(invoice.total_amount().amount(), dec!(100.00));
    }

    #[test]
    fn terminal_invoice_rejects_every_mutation_unchanged() {
        let clock = TemporalFixtures::clock();
        let mut invoice = InvoiceBuilder::new().build_pending(&clock);
        let item_id = invoice.items()[0].id();
        invoice.cancel("customer withdrew the order", &clock).unwrap();

        let snapshot = invoice.clone();

        assert!(matches!(
            invoice.add_item("X", dec!(1), usd(dec!(1)), true, true, &clock),
            Err(InvoiceError::InvoiceClosed { .. })
        ));
        assert!(matches!(
            invoice.update_item(item_id, LineItemPatch::default(), &clock),
            Err(InvoiceError::InvoiceClosed { .. })
        ));
        assert!(matches!(
            invoice.remove_item(item_id, &clock),
            Err(InvoiceError::InvoiceClosed { .. })
        ));
        assert!(matches!(
            invoice.apply_tax("state", dec!(0.08), None, &clock),
            Err(InvoiceError::InvoiceClosed { .. })
        ));
        assert!(matches!(
            invoice.apply_discount(DiscountType::Percentage, dec!(5), None, None, &clock),
            Err(InvoiceError::InvoiceClosed { .. })
        ));
        assert!(matches!(
            invoice.record_payment(
                PaymentMethod::Cash,
                usd(dec!(1)),
                TemporalFixtures::now(),
                None,
                None,
                &clock
            ),
            Err(InvoiceError::InvoiceClosed { .. })
        ));

        assert_eq!(invoice, snapshot);
    }

    #[test]
    fn refunded_is_terminal() {
        let clock = TemporalFixtures::clock();
        let mut invoice = InvoiceBuilder::new().build_pending(&clock);
        invoice
            .record_payment(
                PaymentMethod::Cash,
                usd(dec!(100)),
                TemporalFixtures::now(),
                None,
                None,
                &clock,
            )
            .unwrap();
        assert_eq!(invoice.status(), InvoiceStatus::Paid);

        invoice.refund(&clock).unwrap();
        assert_eq!(invoice.status(), InvoiceStatus::Refunded);

        assert!(matches!(
            invoice.cancel("too late", &clock),
            Err(InvoiceError::InvalidTransition { .. })
        ));
        assert!(matches!(
            invoice.record_payment(
                PaymentMethod::Cash,
                usd(dec!(1)),
                TemporalFixtures::now(),
                None,
                None,
                &clock
            ),
            Err(InvoiceError::InvoiceClosed { .. })
        ));
    }

    #[test]
    fn paid_invoice_cannot_be_cancelled() {
        let clock = TemporalFixtures::clock();
        let mut invoice = InvoiceBuilder::new().build_pending(&clock);
        invoice
            .record_payment(
                PaymentMethod::Cash,
                usd(dec!(100)),
                TemporalFixtures::now(),
                None,
                None,
                &clock,
            )
            .unwrap();

        assert!(matches!(
            invoice.cancel("refund requested", &clock),
            Err(InvoiceError::InvalidTransition {
                from: InvoiceStatus::Paid,
                ..
            })
        ));
    }
}

// ============================================================================
// Persistence shape
// ============================================================================

mod serde_tests {
    use super::*;

    #[test]
    fn serde_round_trip_preserves_derived_fields_and_status() {
        let clock = TemporalFixtures::clock();
        let mut invoice = InvoiceBuilder::new()
            .with_invoice_number("INV-2025-0042")
            .build_pending(&clock);
        invoice = invoice
            .with_terms("Net 30")
            .with_billing_address("1 Main St, Springfield")
            .with_shipping_address("2 Dock Rd, Springfield");
        invoice
            .apply_discount(
                DiscountType::Percentage,
                dec!(10),
                Some("Loyalty".to_string()),
                Some("LOYAL10".to_string()),
                &clock,
            )
            .unwrap();
        invoice.apply_tax("state", dec!(0.08), None, &clock).unwrap();
        invoice
            .record_payment(
                PaymentMethod::PayPal,
                usd(dec!(40.00)),
                TemporalFixtures::now(),
                Some("PP-12".to_string()),
                Some("first installment".to_string()),
                &clock,
            )
            .unwrap();

        let json = serde_json::to_string(&invoice).unwrap();
        let reloaded: domain_invoicing::Invoice = serde_json::from_str(&json).unwrap();

        assert_eq!(reloaded, invoice);
        assert_eq!(reloaded.subtotal(), invoice.subtotal());
        assert_eq!(reloaded.discount_amount(), invoice.discount_amount());
        assert_eq!(reloaded.tax_amount(), invoice.tax_amount());
        assert_eq!(reloaded.total_amount(), invoice.total_amount());
        assert_eq!(reloaded.paid_amount(), invoice.paid_amount());
        assert_eq!(reloaded.balance_amount(), invoice.balance_amount());
        assert_eq!(reloaded.status(), invoice.status());
        assert_eq!(reloaded.items().len(), 1);
        assert_eq!(reloaded.taxes().len(), 1);
        assert_eq!(reloaded.discounts().len(), 1);
        assert_eq!(reloaded.payments().len(), 1);
    }

    #[test]
    fn all_statuses_serialize() {
        let statuses = vec![
            InvoiceStatus::Draft,
            InvoiceStatus::Pending,
            InvoiceStatus::Sent,
            InvoiceStatus::Paid,
            InvoiceStatus::PartialPaid,
            InvoiceStatus::Overdue,
            InvoiceStatus::Cancelled,
            InvoiceStatus::Refunded,
        ];

        for status in statuses {
            let json = serde_json::to_string(&status).unwrap();
            assert!(!json.is_empty());
        }
    }
}

// ============================================================================
// Properties
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum ItemOp {
        Add { quantity: u32, unit_cents: u32 },
        UpdateQuantity { index: usize, quantity: u32 },
        Remove { index: usize },
    }

    fn item_op() -> impl Strategy<Value = ItemOp> {
        prop_oneof![
            (1u32..500, 0u32..100_000).prop_map(|(quantity, unit_cents)| ItemOp::Add {
                quantity,
                unit_cents
            }),
            (0usize..8, 1u32..500).prop_map(|(index, quantity)| ItemOp::UpdateQuantity {
                index,
                quantity
            }),
            (0usize..8).prop_map(|index| ItemOp::Remove { index }),
        ]
    }

    proptest! {
        #[test]
        fn subtotal_always_equals_sum_of_item_totals(ops in prop::collection::vec(item_op(), 1..25)) {
            let clock = TemporalFixtures::clock();
            let mut invoice = InvoiceBuilder::empty().build(&clock);

            for op in ops {
                match op {
                    ItemOp::Add { quantity, unit_cents } => {
                        invoice
                            .add_item(
                                "Item",
                                Decimal::from(quantity),
                                Money::from_minor(unit_cents as i64, Currency::USD),
                                true,
                                true,
                                &clock,
                            )
                            .unwrap();
                    }
                    ItemOp::UpdateQuantity { index, quantity } => {
                        if let Some(item) = invoice.items().get(index) {
                            let id = item.id();
                            invoice
                                .update_item(
                                    id,
                                    LineItemPatch {
                                        quantity: Some(Decimal::from(quantity)),
                                        ..Default::default()
                                    },
                                    &clock,
                                )
                                .unwrap();
                        }
                    }
                    ItemOp::Remove { index } => {
                        if let Some(item) = invoice.items().get(index) {
                            let id = item.id();
                            invoice.remove_item(id, &clock).unwrap();
                        }
                    }
                }

                let expected: Decimal = invoice
                    .items()
                    .iter()
                    .map(|item| item.total_price().amount())
                    .sum();
                prop_assert_eq!(invoice.subtotal().amount(), expected);
            }
        }

        #[test]
        fn recompute_is_idempotent(
            quantity in 1u32..100,
            unit_cents in 1u32..1_000_000,
            discount_pct in 0u32..200,
            tax_bps in 0u32..2_000
        ) {
            let clock = TemporalFixtures::clock();
            let mut invoice = InvoiceBuilder::empty()
                .with_line("Item", Decimal::from(quantity), Decimal::new(unit_cents as i64, 2), true, true)
                .build_pending(&clock);
            invoice
                .apply_discount(DiscountType::Percentage, Decimal::from(discount_pct), None, None, &clock)
                .unwrap();
            invoice
                .apply_tax("tax", Decimal::new(tax_bps as i64, 4), None, &clock)
                .unwrap();

            let before = (
                invoice.subtotal(),
                invoice.discount_amount(),
                invoice.tax_amount(),
                invoice.total_amount(),
                invoice.paid_amount(),
                invoice.balance_amount(),
                invoice.status(),
            );
            invoice.touch(&clock);
            let after = (
                invoice.subtotal(),
                invoice.discount_amount(),
                invoice.tax_amount(),
                invoice.total_amount(),
                invoice.paid_amount(),
                invoice.balance_amount(),
                invoice.status(),
            );
            prop_assert_eq!(before, after);
        }

        #[test]
        fn total_never_negative_from_discounts_alone(
            discount_pct in 0u32..500
        ) {
            let clock = TemporalFixtures::clock();
            let mut invoice = InvoiceBuilder::new().build_pending(&clock);
            invoice
                .apply_discount(DiscountType::Percentage, Decimal::from(discount_pct), None, None, &clock)
                .unwrap();

            prop_assert!(!invoice.total_amount().is_negative());
        }
    }
}
