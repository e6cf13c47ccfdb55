//! Input checks run before any state change.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

const MIN_NAME_CHARS: usize = 2;
const MIN_PASSWORD_CHARS: usize = 6;

static EMAIL_SHAPE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").ok());

/// A rejected user input.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Task title was blank.
    #[error("Title is required")]
    EmptyTitle,
    /// Name was blank.
    #[error("Name cannot be empty")]
    EmptyName,
    /// Name shorter than the sign-up minimum.
    #[error("Name must be at least {MIN_NAME_CHARS} characters")]
    NameTooShort,
    /// Email was blank.
    #[error("Email is required")]
    EmptyEmail,
    /// Email did not look like `local@domain.tld`.
    #[error("Email is invalid")]
    InvalidEmail,
    /// Password was blank.
    #[error("Password is required")]
    EmptyPassword,
    /// Password shorter than the minimum.
    #[error("Password must be at least {MIN_PASSWORD_CHARS} characters")]
    PasswordTooShort,
    /// Password lacks a lowercase letter, an uppercase letter or a digit.
    #[error("Password must contain uppercase, lowercase, and number")]
    WeakPassword,
    /// Confirmation field was blank.
    #[error("Please confirm your password")]
    MissingConfirmation,
    /// Confirmation differs from the password.
    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Reject blank task titles.
///
/// # Errors
/// Returns [`ValidationError::EmptyTitle`] when the title is blank.
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(())
}

/// Check an email address for the `something@something.something` shape.
///
/// # Errors
/// Returns an error when the address is blank or malformed.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::EmptyEmail);
    }
    if looks_like_email(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

fn looks_like_email(email: &str) -> bool {
    EMAIL_SHAPE.as_ref().is_some_and(|shape| shape.is_match(email))
}

/// Enforce the password policy: length, mixed case and a digit.
///
/// # Errors
/// Returns the first policy violation.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyPassword);
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ValidationError::PasswordTooShort);
    }
    let lower = password.chars().any(|c| c.is_ascii_lowercase());
    let upper = password.chars().any(|c| c.is_ascii_uppercase());
    let digit = password.chars().any(|c| c.is_ascii_digit());
    if !(lower && upper && digit) {
        return Err(ValidationError::WeakPassword);
    }
    Ok(())
}

/// Validate a profile edit.
///
/// # Errors
/// Returns the first invalid field.
pub fn validate_profile(name: &str, email: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    validate_email(email)
}

/// Sign-up form fields.
#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    /// Full name.
    pub full_name: String,
    /// Email address.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// Repeated password.
    pub confirm_password: String,
}

impl SignUpForm {
    /// Every field error, in form order. Empty means the form is valid.
    #[must_use]
    pub fn errors(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let name = self.full_name.trim();
        if name.is_empty() {
            errors.push(ValidationError::EmptyName);
        } else if name.chars().count() < MIN_NAME_CHARS {
            errors.push(ValidationError::NameTooShort);
        }
        if let Err(err) = validate_email(&self.email) {
            errors.push(err);
        }
        if let Err(err) = validate_password(&self.password) {
            errors.push(err);
        }
        if self.confirm_password.is_empty() {
            errors.push(ValidationError::MissingConfirmation);
        } else if self.confirm_password != self.password {
            errors.push(ValidationError::PasswordMismatch);
        }
        errors
    }
}
