//! Field validators shared by the registry, ledger and invoice engine
//!
//! Validation failures are rejected before any store interaction.

use bigdecimal::BigDecimal;

use crate::types::{CoreError, CoreResult, LineItem};

/// Transaction amounts carry no sign; direction lives in the entry type
pub fn validate_non_negative_amount(amount: &BigDecimal) -> CoreResult<()> {
    if *amount < BigDecimal::from(0) {
        Err(CoreError::Validation(
            "Amount must not be negative".to_string(),
        ))
    } else {
        Ok(())
    }
}

pub fn validate_required(value: &str, field: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        Err(CoreError::Validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}

/// Account codes sort lexicographically, so they must be plain digit strings
pub fn validate_account_code(code: &str) -> CoreResult<()> {
    validate_required(code, "Account code")?;
    if !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(CoreError::Validation(
            "Account code must be numeric".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_line_items(items: &[LineItem]) -> CoreResult<()> {
    for item in items {
        validate_required(&item.description, "Line item description")?;
        validate_non_negative_amount(&item.amount)?;
        if let Some(rate) = &item.tax_rate {
            if *rate < BigDecimal::from(0) {
                return Err(CoreError::Validation(
                    "Line item tax rate must not be negative".to_string(),
                ));
            }
        }
    }
    Ok(())
}
