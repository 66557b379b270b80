//! ISBN values.

use core::fmt;

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IsbnError {
    #[error("ISBN must have 10 or 13 characters, got {0}")]
    Length(usize),
    #[error("ISBN may only contain digits (ISBN-10 may end in X)")]
    InvalidCharacter,
}

/// A 10- or 13-character ISBN with separators removed.
///
/// Check digits are not verified; the catalog stores whatever the
/// publisher printed as long as the shape is right.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Isbn(String);

impl Isbn {
    /// Parse an ISBN, ignoring hyphens and spaces.
    ///
    /// # Errors
    ///
    /// Returns [`IsbnError`] for wrong length or characters.
    pub fn parse(s: &str) -> Result<Self, IsbnError> {
        let compact: String = s
            .chars()
            .filter(|c| *c != '-' && !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        let len = compact.chars().count();
        let valid = match len {
            10 => compact
                .char_indices()
                .all(|(i, c)| c.is_ascii_digit() || (i == 9 && c == 'X')),
            13 => compact.chars().all(|c| c.is_ascii_digit()),
            _ => return Err(IsbnError::Length(len)),
        };

        if valid {
            Ok(Self(compact))
        } else {
            Err(IsbnError::InvalidCharacter)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Isbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Isbn {
    type Error = IsbnError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Isbn> for String {
    fn from(isbn: Isbn) -> Self {
        isbn.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_separators() {
        let isbn = Isbn::parse("978-0-13-235088-4").unwrap();
        assert_eq!(isbn.as_str(), "9780132350884");
    }

    #[test]
    fn test_isbn10_with_check_x() {
        assert_eq!(Isbn::parse("0-8044-2957-x").unwrap().as_str(), "080442957X");
        assert_eq!(Isbn::parse("08044X2957"), Err(IsbnError::InvalidCharacter));
    }

    #[test]
    fn test_rejects_bad_length() {
        assert_eq!(Isbn::parse("12345"), Err(IsbnError::Length(5)));
        assert_eq!(Isbn::parse(""), Err(IsbnError::Length(0)));
    }
}
