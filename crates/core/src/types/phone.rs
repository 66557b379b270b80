//! Customer phone numbers.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[allow(clippy::expect_used)]
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+375 \(29\) \d{3}-\d{2}-\d{2}$").expect("phone regex is valid")
});

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    #[error("phone number must be in the format: +375 (29) XXX-XX-XX")]
    Format,
}

/// A phone number in the shop's only accepted format, `+375 (29) XXX-XX-XX`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
    /// Parse a phone number after trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneError::Format`] when the number does not match.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let s = s.trim();
        if PHONE_RE.is_match(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(PhoneError::Format)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Phone {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Phone> for String {
    fn from(phone: Phone) -> Self {
        phone.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_shop_format() {
        assert!(Phone::parse("+375 (29) 123-45-67").is_ok());
        assert!(Phone::parse(" +375 (29) 765-43-21 ").is_ok());
    }

    #[test]
    fn test_rejects_other_formats() {
        for bad in [
            "+375291234567",
            "+375 (33) 123-45-67",
            "375 (29) 123-45-67",
            "+375 (29) 1234-56-7",
            "",
        ] {
            assert_eq!(Phone::parse(bad), Err(PhoneError::Format), "{bad}");
        }
    }
}
