use crate::error::{AppError, Result};

/// Normalizes an SGE user identifier to the digits-only form used as the login
/// field and as the session cache key.
///
/// # Arguments
///
/// * `user` - The identifier as typed (may contain dots, dashes or spaces).
///
/// # Returns
///
/// The digits, or a validation error when none are present.
pub fn normalize_user(user: &str) -> Result<String> {
    let digits: String = user.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.is_empty() {
        return Err(AppError::Validation(
            "SGE user must contain at least one digit".to_string(),
        ));
    }

    if digits.len() > 32 {
        return Err(AppError::Validation(
            "SGE user must be at most 32 digits".to_string(),
        ));
    }

    Ok(digits)
}

/// Masks a normalized user identifier for logs, keeping only the last three digits.
pub fn mask_user(user: &str) -> String {
    let visible = user.len().saturating_sub(3);
    format!("{}{}", "*".repeat(visible), &user[visible..])
}

/// Validates a password.
///
/// # Arguments
///
/// * `password` - The password to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the password is valid.
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(AppError::Validation("Password cannot be empty".to_string()));
    }

    if password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be at most 128 characters".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_formatting() {
        assert_eq!(normalize_user("111.222.333-44").unwrap(), "11122233344");
        assert_eq!(normalize_user(" 11122233344 ").unwrap(), "11122233344");
    }

    #[test]
    fn rejects_identifiers_without_digits() {
        assert!(matches!(normalize_user("admin"), Err(AppError::Validation(_))));
        assert!(normalize_user("").is_err());
    }

    #[test]
    fn masking_keeps_last_three_digits() {
        assert_eq!(mask_user("11122233344"), "********344");
        assert_eq!(mask_user("12"), "12");
    }

    #[test]
    fn password_bounds() {
        assert!(validate_password("").is_err());
        assert!(validate_password("x").is_ok());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }
}
