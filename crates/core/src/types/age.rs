//! Age rules for customers and employees.

use chrono::{Datelike, NaiveDate};

/// Minimum age for customer accounts and employee records.
pub const MIN_AGE: u32 = 18;

/// Errors produced by the age rule.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AgeError {
    #[error("birth date cannot be in the future")]
    InFuture,
    #[error("must be at least {min} years old")]
    TooYoung { min: u32 },
}

/// Age in whole years on `today`.
///
/// Returns `None` when `birth` is after `today`.
///
/// ```
/// use chrono::NaiveDate;
/// use heavyshop_core::age_on;
///
/// let birth = NaiveDate::from_ymd_opt(2000, 6, 15).unwrap();
/// let day_before = NaiveDate::from_ymd_opt(2018, 6, 14).unwrap();
/// assert_eq!(age_on(birth, day_before), Some(17));
/// ```
#[must_use]
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    if birth > today {
        return None;
    }
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// Reject birth dates of people younger than [`MIN_AGE`].
///
/// # Errors
///
/// [`AgeError::InFuture`] for future dates, [`AgeError::TooYoung`] below the limit.
pub fn require_adult(birth: NaiveDate, today: NaiveDate) -> Result<u32, AgeError> {
    let age = age_on(birth, today).ok_or(AgeError::InFuture)?;
    if age < MIN_AGE {
        return Err(AgeError::TooYoung { min: MIN_AGE });
    }
    Ok(age)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_birthday_boundary() {
        let birth = date(2000, 3, 10);
        assert_eq!(age_on(birth, date(2018, 3, 9)), Some(17));
        assert_eq!(age_on(birth, date(2018, 3, 10)), Some(18));
    }

    #[test]
    fn test_leap_day_birth() {
        let birth = date(2004, 2, 29);
        assert_eq!(age_on(birth, date(2022, 2, 28)), Some(17));
        assert_eq!(age_on(birth, date(2022, 3, 1)), Some(18));
    }

    #[test]
    fn test_require_adult() {
        let today = date(2026, 10, 19);
        assert_eq!(require_adult(date(1990, 1, 1), today), Ok(36));
        assert_eq!(
            require_adult(date(2010, 1, 1), today),
            Err(AgeError::TooYoung { min: 18 })
        );
        assert_eq!(require_adult(date(2030, 1, 1), today), Err(AgeError::InFuture));
    }
}
