//! Mexican postal code (código postal).

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PostalCode`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostalCodeError {
    /// Nothing left after normalization.
    #[error("El código postal es requerido")]
    Empty,
    /// Not exactly five ASCII digits after normalization.
    #[error("El código postal debe tener exactamente 5 dígitos")]
    InvalidFormat,
}

/// A five digit postal code.
///
/// Input is normalized before it is validated: whitespace and dashes are
/// stripped, so `"12 345"` and `"12-345"` both parse to `"12345"`.
///
/// ```
/// use refaccionaria_core::PostalCode;
///
/// assert_eq!(PostalCode::parse("12 345").unwrap().as_str(), "12345");
/// assert!(PostalCode::parse("1234").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostalCode(String);

impl PostalCode {
    /// Number of digits in a postal code.
    pub const LENGTH: usize = 5;

    /// Strip whitespace and dashes.
    #[must_use]
    pub fn normalize(raw: &str) -> String {
        raw.chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect()
    }

    /// Normalize then validate.
    ///
    /// # Errors
    ///
    /// Returns [`PostalCodeError::Empty`] when nothing remains after
    /// normalization, and [`PostalCodeError::InvalidFormat`] when the result
    /// is not exactly five ASCII digits.
    pub fn parse(raw: &str) -> Result<Self, PostalCodeError> {
        let normalized = Self::normalize(raw);
        if normalized.is_empty() {
            return Err(PostalCodeError::Empty);
        }
        if normalized.len() != Self::LENGTH || !normalized.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PostalCodeError::InvalidFormat);
        }
        Ok(Self(normalized))
    }

    /// Returns the postal code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PostalCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
