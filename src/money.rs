//! Presentation helpers for monetary amounts.
//!
//! Amounts are summed as unrounded `f64`s. Rounding to two decimal places only
//! happens here, when a view model is serialised or an amount is displayed.

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};
use serde::Serializer;

/// The currency that amounts are displayed in.
pub const CURRENCY: &str = "XAF";

/// Round `amount` to two decimal places, mapping `-0.00` to `0.00`.
pub fn round_cents(amount: f64) -> f64 {
    let rounded = (amount * 100.0).round() / 100.0;

    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Serialise an amount rounded to two decimal places.
///
/// Use with `#[serde(serialize_with = "crate::money::serialize_cents")]`.
pub fn serialize_cents<S>(amount: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(round_cents(*amount))
}

/// Format `amount` with thousands separators, two decimal places and the
/// currency code, e.g. "1,234.50 XAF".
pub fn format_amount(amount: f64) -> String {
    static FMT: OnceLock<Formatter> = OnceLock::new();

    let fmt = FMT.get_or_init(|| {
        Formatter::new()
            .separator(',')
            .expect("comma is a valid separator")
            .precision(Precision::Decimals(2))
    });

    let amount = round_cents(amount);
    let sign = if amount < 0.0 { "-" } else { "" };

    // numfmt drops trailing zeros and renders zero as "0", so pad the fraction ourselves.
    let formatted = fmt.fmt_string(amount.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((&formatted, ""));

    format!("{sign}{whole}.{fraction:0<2} {CURRENCY}")
}
