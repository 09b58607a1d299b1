//! Bill totals
//!
//! Pure functions of the draft (or an item list) and the tax settings,
//! recomputed on demand. Arithmetic is done in `Decimal` and converted to
//! `f64` for the wire.

use rust_decimal::prelude::*;
use shared::models::{Bill, BillItem, Product, TaxSettings};

use super::draft::OrderDraft;
use super::line::OrderLine;

/// Decimal places kept for stored amounts
const DECIMAL_PLACES: u32 = 2;

/// Totals of an order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub subtotal: f64,
    pub sgst_amount: f64,
    pub cgst_amount: f64,
    /// `floor(subtotal + sgst + cgst)`, computed before any rounding
    pub payable: f64,
}

impl Totals {
    /// Totals from a subtotal and tax percentages
    pub fn from_subtotal(subtotal: Decimal, tax: &TaxSettings) -> Self {
        let hundred = Decimal::ONE_HUNDRED;
        let sgst_amount = subtotal * to_decimal(tax.sgst) / hundred;
        let cgst_amount = subtotal * to_decimal(tax.cgst) / hundred;
        let payable = (subtotal + sgst_amount + cgst_amount).floor();

        Self {
            subtotal: to_f64(subtotal),
            sgst_amount: to_f64(sgst_amount),
            cgst_amount: to_f64(cgst_amount),
            payable: to_f64(payable),
        }
    }

    /// Write totals and tax percentages onto a bill payload
    pub fn apply_to(&self, bill: &mut Bill, tax: &TaxSettings) {
        bill.sub_total = self.subtotal;
        bill.sgst = tax.sgst;
        bill.cgst = tax.cgst;
        bill.sgst_amount = self.sgst_amount;
        bill.cgst_amount = self.cgst_amount;
        bill.total_amount = self.payable;
    }
}

/// Convert f64 to Decimal; NaN and infinities become zero
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal to f64 with half-up rounding to 2 places
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

fn unit_price(product: &Product) -> Decimal {
    to_decimal(product.unit_price())
}

/// Unit price times billable quantity; removed lines contribute nothing
pub fn line_total(line: &OrderLine) -> Decimal {
    unit_price(line.product()) * Decimal::from(line.quantity())
}

/// Totals of what the draft currently shows
pub fn draft_totals(draft: &OrderDraft, tax: &TaxSettings) -> Totals {
    let subtotal: Decimal = draft
        .lines()
        .iter()
        .filter(|l| !l.is_removed())
        .map(line_total)
        .sum();
    Totals::from_subtotal(subtotal, tax)
}

/// Totals of a bill item list: active rows at their own row price
pub fn item_totals(items: &[BillItem], tax: &TaxSettings) -> Totals {
    let subtotal: Decimal = items
        .iter()
        .filter(|item| item.is_active())
        .map(|item| to_decimal(item.price) * Decimal::from(item.quantity))
        .sum();
    Totals::from_subtotal(subtotal, tax)
}
