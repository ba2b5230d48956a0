//! Field validators for request parameters
//!
//! Identifiers end up unquoted in SQL text, so they are held to a narrow
//! character set here, before any statement is built.

use validator::ValidationError;

use super::filters::FilterCondition;
use crate::utils::sql::is_valid_identifier;

/// Maximum identifier length (database, table, column)
pub const MAX_IDENTIFIER_LENGTH: usize = 256;

/// Validator for identifiers interpolated into SQL unquoted
pub fn validate_identifier<T: AsRef<str>>(value: T) -> Result<(), ValidationError> {
    let value = value.as_ref();
    if value.is_empty() {
        return Err(ValidationError::new("identifier_empty")
            .with_message("Identifier cannot be empty".into()));
    }
    if value.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ValidationError::new("identifier_too_long").with_message(
            format!("Identifier too long (max {} chars)", MAX_IDENTIFIER_LENGTH).into(),
        ));
    }
    if !is_valid_identifier(value) {
        return Err(ValidationError::new("identifier_invalid").with_message(
            format!(
                "Invalid identifier '{}': only letters, digits, '_', '.', '$' and '-' are allowed",
                value
            )
            .into(),
        ));
    }
    Ok(())
}

/// Same as [`validate_identifier`] but an empty value is accepted
pub fn validate_optional_identifier<T: AsRef<str>>(value: T) -> Result<(), ValidationError> {
    if value.as_ref().is_empty() {
        return Ok(());
    }
    validate_identifier(value)
}

/// Every filter must compile and name a well-formed field path
pub fn validate_filters<T: AsRef<[FilterCondition]>>(filters: T) -> Result<(), ValidationError> {
    for (i, filter) in filters.as_ref().iter().enumerate() {
        if let Err(e) = filter.compile() {
            return Err(ValidationError::new("filter_invalid")
                .with_message(format!("data_filters[{}]: {}", i, e).into()));
        }
        if !is_valid_identifier(&filter.field_name) {
            return Err(ValidationError::new("filter_field_invalid").with_message(
                format!(
                    "data_filters[{}]: invalid field name '{}'",
                    i, filter.field_name
                )
                .into(),
            ));
        }
    }
    Ok(())
}
