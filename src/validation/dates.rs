//! Conversion between ISO dates used internally and the `DD/MM/YYYY` form SGE speaks.

use chrono::NaiveDate;

use crate::error::{AppError, Result};

const ISO_FORMAT: &str = "%Y-%m-%d";
const LEGACY_FORMAT: &str = "%d/%m/%Y";

/// Converts `YYYY-MM-DD` to the legacy `DD/MM/YYYY`.
pub fn to_legacy_date(iso: &str) -> Result<String> {
    let date = NaiveDate::parse_from_str(iso.trim(), ISO_FORMAT)
        .map_err(|_| AppError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", iso)))?;
    Ok(date.format(LEGACY_FORMAT).to_string())
}

/// Converts the legacy `DD/MM/YYYY` to `YYYY-MM-DD`.
pub fn from_legacy_date(legacy: &str) -> Result<String> {
    let date = NaiveDate::parse_from_str(legacy.trim(), LEGACY_FORMAT).map_err(|_| {
        AppError::Validation(format!("Invalid legacy date '{}', expected DD/MM/YYYY", legacy))
    })?;
    Ok(date.format(ISO_FORMAT).to_string())
}

/// Best-effort conversion for dates embedded in legacy pages, which sometimes carry a
/// trailing time (`10/03/2026 14:22`). Returns `None` when nothing parses.
pub fn legacy_date_lenient(raw: &str) -> Option<String> {
    let first = raw.split_whitespace().next()?;
    from_legacy_date(first).ok()
}

/// Validates that a month/year pair can address a monthly report.
pub fn validate_month(month: u32, year: i32) -> Result<()> {
    if !(1..=12).contains(&month) {
        return Err(AppError::Validation("Month must be between 1 and 12".to_string()));
    }
    if !(2000..=2100).contains(&year) {
        return Err(AppError::Validation("Year is out of range".to_string()));
    }
    Ok(())
}
