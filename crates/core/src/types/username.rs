//! Login names.

use core::fmt;

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    #[error("username must be between {min} and {max} characters")]
    Length { min: usize, max: usize },
    #[error("username may contain only letters, digits and @/./+/-/_")]
    InvalidCharacter,
}

/// A unique login name: 3-150 characters of letters, digits and `@.+-_`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    pub const MIN_LENGTH: usize = 3;
    pub const MAX_LENGTH: usize = 150;

    /// # Errors
    ///
    /// Returns [`UsernameError`] for bad length or characters.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        let s = s.trim();
        let len = s.chars().count();
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&len) {
            return Err(UsernameError::Length {
                min: Self::MIN_LENGTH,
                max: Self::MAX_LENGTH,
            });
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
        {
            return Err(UsernameError::InvalidCharacter);
        }
        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Username> for String {
    fn from(username: Username) -> Self {
        username.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert!(Username::parse("reader_01").is_ok());
        assert!(Username::parse("a.b+c@d-e").is_ok());
    }

    #[test]
    fn test_length_limits() {
        assert!(matches!(Username::parse("ab"), Err(UsernameError::Length { .. })));
        assert!(matches!(
            Username::parse(&"x".repeat(151)),
            Err(UsernameError::Length { .. })
        ));
    }

    #[test]
    fn test_rejects_spaces_and_symbols() {
        assert_eq!(Username::parse("john doe"), Err(UsernameError::InvalidCharacter));
        assert_eq!(Username::parse("john#1"), Err(UsernameError::InvalidCharacter));
    }
}
