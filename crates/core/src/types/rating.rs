//! Review ratings.

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RatingError {
    #[error("rating must be between 1 and 5, got {0}")]
    OutOfRange(i32),
}

/// A star rating from 1 to 5.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "i32", into = "i32")]
pub struct Rating(i32);

impl Rating {
    pub const MIN: i32 = 1;
    pub const MAX: i32 = 5;

    /// # Errors
    ///
    /// Returns [`RatingError::OutOfRange`] outside `1..=5`.
    pub const fn new(value: i32) -> Result<Self, RatingError> {
        if value < Self::MIN || value > Self::MAX {
            return Err(RatingError::OutOfRange(value));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Filled and empty stars, e.g. `★★★☆☆`.
    #[must_use]
    pub fn stars(self) -> String {
        let filled = usize::try_from(self.0).unwrap_or(0);
        let empty = usize::try_from(Self::MAX - self.0).unwrap_or(0);
        format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
    }
}

impl TryFrom<i32> for Rating {
    type Error = RatingError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for i32 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(Rating::new(1).is_ok());
        assert!(Rating::new(5).is_ok());
        assert_eq!(Rating::new(0), Err(RatingError::OutOfRange(0)));
        assert_eq!(Rating::new(6), Err(RatingError::OutOfRange(6)));
    }

    #[test]
    fn test_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<Rating>("7").is_err());
        assert_eq!(serde_json::from_str::<Rating>("4").unwrap().value(), 4);
    }

    #[test]
    fn test_stars() {
        assert_eq!(Rating::new(3).unwrap().stars(), "★★★☆☆");
    }
}
