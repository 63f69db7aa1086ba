use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::DomainError;

// E.164-style phone numbers, optional leading +
static PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[1-9]\d{1,14}$").unwrap());

// US zip codes, 5 digits with optional +4 extension
static ZIP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{5}(-\d{4})?$").unwrap());

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

pub(crate) fn require_non_blank(value: &str, field: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

pub(crate) fn require_positive(value: f64, field: &str) -> Result<(), DomainError> {
    if !(value > 0.0) {
        return Err(DomainError::Validation(format!(
            "{} must be greater than 0",
            field
        )));
    }
    Ok(())
}

pub(crate) fn validate_phone(phone: &str) -> Result<(), DomainError> {
    if !PHONE.is_match(phone) {
        return Err(DomainError::Validation(
            "Invalid phone number format".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_zip_code(zip: &str) -> Result<(), DomainError> {
    if !ZIP.is_match(zip) {
        return Err(DomainError::Validation(
            "Invalid zip code format".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_email(email: &str) -> Result<(), DomainError> {
    if !EMAIL.is_match(email) {
        return Err(DomainError::Validation("Invalid email format".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_accepts_e164() {
        assert!(validate_phone("+14155552671").is_ok());
        assert!(validate_phone("4155552671").is_ok());
    }

    #[test]
    fn phone_rejects_garbage() {
        assert!(validate_phone("not-a-phone").is_err());
        assert!(validate_phone("0123").is_err());
        assert!(validate_phone("+").is_err());
    }

    #[test]
    fn zip_accepts_five_and_nine_digit_forms() {
        assert!(validate_zip_code("94107").is_ok());
        assert!(validate_zip_code("94107-1234").is_ok());
    }

    #[test]
    fn zip_rejects_malformed() {
        assert!(validate_zip_code("9410").is_err());
        assert!(validate_zip_code("94107-12").is_err());
        assert!(validate_zip_code("ABCDE").is_err());
    }

    #[test]
    fn email_rejects_missing_domain() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("alice@localhost").is_err());
        assert!(validate_email("alice").is_err());
    }
}
