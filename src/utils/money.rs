//! Monetary rounding helpers
//!
//! All invoice and tax figures are fixed to 2 decimal places using
//! round-half-away-from-zero. Sums are rounded once, after summation, never
//! per line; the ordering matters for cent-level reproducibility.

use bigdecimal::{BigDecimal, RoundingMode};

/// Round to 2 decimal places, ties away from zero
pub fn round2(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(2, RoundingMode::HalfUp)
}

/// A 2-decimal amount from a whole number of cents
pub fn cents(n: i64) -> BigDecimal {
    BigDecimal::new(n.into(), 2)
}

/// Standard GST rate (10%)
pub fn standard_gst_rate() -> BigDecimal {
    cents(10)
}
