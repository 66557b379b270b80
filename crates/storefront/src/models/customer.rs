//! Customer profiles.
//!
//! A user must have a customer profile (phone, address, birth date) before
//! they can order or review.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use heavyshop_core::{CustomerId, Phone, UserId, age_on, require_adult};

// Area/Location names as used by the IANA database, plus bare UTC.
#[allow(clippy::expect_used)]
static TIMEZONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(UTC|[A-Z][A-Za-z_]+(/[A-Z][A-Za-z0-9_+\-]+){1,2})$")
        .expect("timezone regex is valid")
});

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Customer {
    pub id: CustomerId,
    pub user_id: UserId,
    pub phone: String,
    pub address: String,
    pub birth_date: NaiveDate,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    #[must_use]
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        age_on(self.birth_date, today)
    }
}

/// Customer profile as submitted by a form or the API.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerProfileInput {
    pub phone: String,
    pub address: String,
    pub birth_date: NaiveDate,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "UTC".to_owned()
}

impl CustomerProfileInput {
    /// Check phone format, adult age and timezone name.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message for the first invalid field.
    pub fn validate(mut self, today: NaiveDate) -> Result<Self, String> {
        self.phone = Phone::parse(&self.phone)
            .map_err(|e| e.to_string())?
            .to_string();
        self.address = self.address.trim().to_owned();
        if self.address.is_empty() {
            return Err("Address is required".to_owned());
        }
        require_adult(self.birth_date, today).map_err(|e| e.to_string())?;
        self.timezone = self.timezone.trim().to_owned();
        if self.timezone.is_empty() {
            self.timezone = default_timezone();
        }
        if !is_timezone_name(&self.timezone) {
            return Err(format!("Unknown timezone: {}", self.timezone));
        }
        Ok(self)
    }
}

/// Whether `name` looks like an IANA zone name such as `Europe/Minsk`.
#[must_use]
pub fn is_timezone_name(name: &str) -> bool {
    name.len() <= 64 && TIMEZONE_RE.is_match(name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn input() -> CustomerProfileInput {
        CustomerProfileInput {
            phone: "+375 (29) 123-45-67".to_owned(),
            address: " Minsk, Nezavisimosti 4 ".to_owned(),
            birth_date: NaiveDate::from_ymd_opt(1995, 5, 17).unwrap(),
            timezone: "Europe/Minsk".to_owned(),
        }
    }

    #[test]
    fn test_valid_profile() {
        let profile = input().validate(today()).unwrap();
        assert_eq!(profile.address, "Minsk, Nezavisimosti 4");
    }

    #[test]
    fn test_rejects_minor() {
        let mut profile = input();
        profile.birth_date = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
        assert!(profile.validate(today()).is_err());
    }

    #[test]
    fn test_rejects_wrong_phone() {
        let mut profile = input();
        profile.phone = "80291234567".to_owned();
        let err = profile.validate(today()).unwrap_err();
        assert!(err.contains("+375 (29) XXX-XX-XX"));
    }

    #[test]
    fn test_timezone_names() {
        assert!(is_timezone_name("UTC"));
        assert!(is_timezone_name("America/Argentina/Buenos_Aires"));
        assert!(is_timezone_name("Etc/GMT+3"));
        assert!(!is_timezone_name("Minsk"));
        assert!(!is_timezone_name("Europe/"));
        assert!(!is_timezone_name("'; DROP TABLE"));
    }

    #[test]
    fn test_blank_timezone_defaults_to_utc() {
        let mut profile = input();
        profile.timezone = "  ".to_owned();
        assert_eq!(profile.validate(today()).unwrap().timezone, "UTC");
    }
}
