use time::Date;
use time::macros::format_description;

use crate::constants::*;
use crate::error::ValidationError;
use crate::models::{ExpensePatch, LedgerEntryPatch, NewExpense, NewLedgerEntry};

pub fn validate_string_length(
    value: &str,
    field_name: &str,
    max_length: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError(format!("{} cannot be empty", field_name)));
    }
    if value.chars().count() > max_length {
        return Err(ValidationError(format!(
            "{} must be less than {} characters",
            field_name, max_length
        )));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    validate_string_length(description, "Description", MAX_DESCRIPTION_LENGTH)
}

pub fn validate_counterparty(counterparty: &str) -> Result<(), ValidationError> {
    validate_string_length(counterparty, "Person name", MAX_COUNTERPARTY_LENGTH)
}

pub fn validate_amount(amount: f64) -> Result<(), ValidationError> {
    if !amount.is_finite() {
        return Err(ValidationError::new(ERR_INVALID_AMOUNT));
    }
    if amount < 0.0 {
        return Err(ValidationError::new(ERR_NEGATIVE_AMOUNT));
    }
    Ok(())
}

/// Parse an amount typed into a form field.
pub fn parse_amount(value: &str) -> Result<f64, ValidationError> {
    let amount = value
        .trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::new(ERR_INVALID_AMOUNT))?;
    validate_amount(amount)?;
    Ok(amount)
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Result<Date, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("Date cannot be empty"));
    }
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| ValidationError::new(ERR_INVALID_DATE))
}

pub fn validate_new_expense(expense: &NewExpense) -> Result<(), ValidationError> {
    validate_amount(expense.amount)?;
    validate_description(&expense.description)
}

pub fn validate_expense_patch(patch: &ExpensePatch) -> Result<(), ValidationError> {
    if patch.is_empty() {
        return Err(ValidationError::new(ERR_EMPTY_PATCH));
    }
    if let Some(amount) = patch.amount {
        validate_amount(amount)?;
    }
    if let Some(ref description) = patch.description {
        validate_description(description)?;
    }
    Ok(())
}

pub fn validate_new_ledger_entry(entry: &NewLedgerEntry) -> Result<(), ValidationError> {
    validate_counterparty(&entry.counterparty)?;
    validate_amount(entry.amount)?;
    validate_description(&entry.description)
}

pub fn validate_ledger_entry_patch(patch: &LedgerEntryPatch) -> Result<(), ValidationError> {
    if patch.is_empty() {
        return Err(ValidationError::new(ERR_EMPTY_PATCH));
    }
    if let Some(ref counterparty) = patch.counterparty {
        validate_counterparty(counterparty)?;
    }
    if let Some(amount) = patch.amount {
        validate_amount(amount)?;
    }
    if let Some(ref description) = patch.description {
        validate_description(description)?;
    }
    Ok(())
}
