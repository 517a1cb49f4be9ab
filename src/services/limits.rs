//! Result-size limit validation

use crate::error::AppError;

/// Validate a caller-supplied limit
///
/// # Arguments
/// * `name` - Parameter name, echoed in the error message
/// * `value` - Requested limit
/// * `max` - Hard ceiling
///
/// # Returns
/// * `Ok(i64)` - The limit, unchanged
/// * `Err(AppError::InvalidLimit)` - Limit is non-positive or above `max`; never clamped
pub fn validate_limit(name: &str, value: i64, max: i64) -> Result<i64, AppError> {
    if value < 1 || value > max {
        return Err(AppError::InvalidLimit(format!(
            "{} must be between 1 and {}, got {}",
            name, max, value
        )));
    }
    Ok(value)
}

/// Parse and validate an optional raw query value, falling back to `default` when omitted
///
/// A value that is not an integer is an [`AppError::InvalidLimit`] naming `name`.
pub fn resolve_limit(
    name: &str,
    raw: Option<&str>,
    default: i64,
    max: i64,
) -> Result<i64, AppError> {
    let value = match raw.map(str::trim).filter(|r| !r.is_empty()) {
        Some(raw) => raw.parse::<i64>().map_err(|_| {
            AppError::InvalidLimit(format!(
                "{} must be an integer between 1 and {}, got {:?}",
                name, max, raw
            ))
        })?,
        None => default,
    };
    validate_limit(name, value, max)
}
