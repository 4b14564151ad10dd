//! Input validation for store operations.
//!
//! Validates item keys, values, and prompt text at the boundary of each
//! public operation.

use crate::error::{Result, ValidationError};

/// Validate an item key.
///
/// Keys are opaque to coffer, so the only rule is that they are non-empty.
///
/// # Errors
///
/// Returns `ValidationError::EmptyKey` if the key is empty.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(ValidationError::EmptyKey.into());
    }

    Ok(())
}

/// Validate an item value.
///
/// # Arguments
///
/// * `key` - The key name (for error messages)
/// * `value` - The value to validate
///
/// # Errors
///
/// Returns `ValidationError::EmptyValue` if the value is empty.
pub fn validate_value(key: &str, value: &[u8]) -> Result<()> {
    if value.is_empty() {
        return Err(ValidationError::EmptyValue(key.to_string()).into());
    }

    Ok(())
}

/// Validate prompt text for a user-presence operation.
///
/// # Errors
///
/// Returns `ValidationError::MissingPrompt` when no prompt was supplied and
/// `ValidationError::EmptyPrompt` when it is blank.
pub fn validate_prompt(prompt: Option<&str>) -> Result<&str> {
    match prompt {
        None => Err(ValidationError::MissingPrompt.into()),
        Some(p) if p.trim().is_empty() => Err(ValidationError::EmptyPrompt.into()),
        Some(p) => Ok(p),
    }
}
