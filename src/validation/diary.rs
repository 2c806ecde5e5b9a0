use crate::error::{AppError, Result};

/// Longest lesson content SGE stores.
pub const MAX_CONTENT_CHARS: usize = 4000;

/// Validates a legacy identifier (class, subject, record) and returns it trimmed.
///
/// # Arguments
///
/// * `field` - Name used in the error message.
/// * `value` - The identifier as received.
pub fn require_id<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} cannot be empty", field)));
    }
    if trimmed.len() > 64 || trimmed.chars().any(|c| c.is_control()) {
        return Err(AppError::Validation(format!("{} is not a valid identifier", field)));
    }
    Ok(trimmed)
}

/// Validates a lesson period (1-based).
pub fn validate_period(period: u32) -> Result<()> {
    if !(1..=12).contains(&period) {
        return Err(AppError::Validation(
            "Period must be between 1 and 12".to_string(),
        ));
    }
    Ok(())
}

/// Validates free text sent to SGE and returns it trimmed.
pub fn validate_text<'a>(field: &str, text: &'a str) -> Result<&'a str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} cannot be empty", field)));
    }
    if trimmed.chars().count() > MAX_CONTENT_CHARS {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, MAX_CONTENT_CHARS
        )));
    }
    Ok(trimmed)
}
