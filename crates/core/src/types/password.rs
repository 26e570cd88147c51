//! Password policy for registration and password resets.
//!
//! Hashing and storage belong to the REST backend. This type only enforces
//! the policy before a password leaves the web tier, and keeps the value out
//! of `Debug` output.

use core::fmt;

/// Errors that can occur when validating a [`Password`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password must be at least {min} characters")]
    TooShort { min: usize },
    #[error("password must be at most {max} characters")]
    TooLong { max: usize },
    #[error("password must contain at least one letter and one number")]
    MissingCharacterClass,
    #[error("passwords do not match")]
    Mismatch,
}

/// A password that satisfies the account policy.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Minimum length in characters.
    pub const MIN_LENGTH: usize = 8;
    /// Maximum length in characters.
    pub const MAX_LENGTH: usize = 128;

    /// Validate a new password.
    ///
    /// # Errors
    ///
    /// Returns an error if the password is too short, too long, or lacks
    /// a letter or a digit.
    pub fn new(value: &str) -> Result<Self, PasswordError> {
        let length = value.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(PasswordError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }
        if length > Self::MAX_LENGTH {
            return Err(PasswordError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        let has_letter = value.chars().any(char::is_alphabetic);
        let has_digit = value.chars().any(|c| c.is_ascii_digit());
        if !(has_letter && has_digit) {
            return Err(PasswordError::MissingCharacterClass);
        }
        Ok(Self(value.to_owned()))
    }

    /// Validate a password together with its confirmation field.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordError::Mismatch`] when the two inputs differ, or
    /// any error from [`Password::new`].
    pub fn with_confirmation(value: &str, confirmation: &str) -> Result<Self, PasswordError> {
        if value != confirmation {
            return Err(PasswordError::Mismatch);
        }
        Self::new(value)
    }

    /// Expose the raw value for sending to the backend.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}
