use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AppError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Returns the trimmed value, or `ValidationError` naming `field` when it is
/// absent or blank.
pub(crate) fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, AppError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::missing(field)),
    }
}

/// Passwords are taken verbatim (no trimming); a blank one counts as not
/// supplied.
pub(crate) fn optional_secret(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

pub(crate) fn required_secret<'a>(
    value: &'a Option<String>,
    field: &str,
) -> Result<&'a str, AppError> {
    optional_secret(value).ok_or_else(|| AppError::missing(field))
}

pub(crate) fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(AppError::Validation("invalid email".into()));
    }
    Ok(email)
}
