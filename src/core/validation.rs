//! Input checks owned by callers of the store.
//!
//! The store accepts any amount and category; front ends run these before
//! appending so that only positive amounts in a known category reach disk.

use crate::{domain::Category, errors::ValidationError};

/// Rejects amounts that are not strictly positive finite numbers.
pub fn validate_amount(amount: f64) -> Result<f64, ValidationError> {
    if !amount.is_finite() {
        return Err(ValidationError::NonFiniteAmount);
    }
    if amount <= 0.0 {
        return Err(ValidationError::NonPositiveAmount(amount));
    }
    Ok(amount)
}

/// Resolves a category label against the known set.
pub fn validate_category(label: &str) -> Result<Category, ValidationError> {
    label.parse()
}

/// Validates a full expense submission, returning the canonical category.
pub fn validate_expense(amount: f64, category: &str) -> Result<Category, ValidationError> {
    validate_amount(amount)?;
    validate_category(category)
}
