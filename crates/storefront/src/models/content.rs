//! Company content: news, glossary, FAQ, staff, vacancies and marketing blocks.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use heavyshop_core::pricing::PromoWindow;
use heavyshop_core::{
    ArticleId, BannerId, EmployeeId, FaqId, HistoryEntryId, PartnerId, PickupPointId, PromoCodeId,
    TermId, VacancyId,
};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub image: Option<String>,
    pub published_at: DateTime<Utc>,
}

impl Article {
    #[must_use]
    pub fn published_display(&self) -> String {
        self.published_at.format("%d.%m.%Y").to_string()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewArticle {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub image: Option<String>,
}

impl NewArticle {
    /// # Errors
    ///
    /// Empty title/summary/content or overlong title/summary.
    pub fn validate(mut self) -> Result<Self, String> {
        self.title = self.title.trim().to_owned();
        self.summary = self.summary.trim().to_owned();
        if self.title.is_empty() || self.summary.is_empty() || self.content.trim().is_empty() {
            return Err("Title, summary and content are required".to_owned());
        }
        if self.title.chars().count() > 200 || self.summary.chars().count() > 300 {
            return Err("Title or summary is too long".to_owned());
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Term {
    pub id: TermId,
    pub term: String,
    pub definition: String,
    pub added_at: NaiveDate,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Faq {
    pub id: FaqId,
    pub question: String,
    pub answer: String,
    pub category: String,
    pub created_at: NaiveDate,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub photo: Option<String>,
    pub position: String,
    pub description: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Vacancy {
    pub id: VacancyId,
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub salary: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Vacancy form submitted by staff.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewVacancy {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub salary: String,
    /// HTML checkboxes send `on` when ticked and nothing otherwise.
    #[serde(default)]
    pub is_active: Option<String>,
}

impl NewVacancy {
    #[must_use]
    pub fn active(&self) -> bool {
        self.is_active
            .as_deref()
            .is_some_and(|v| matches!(v, "on" | "true" | "1"))
    }

    /// # Errors
    ///
    /// Empty title or description, or overlong title/salary.
    pub fn validate(mut self) -> Result<Self, String> {
        self.title = self.title.trim().to_owned();
        self.description = self.description.trim().to_owned();
        if self.title.is_empty() {
            return Err("Title is required".to_owned());
        }
        if self.description.is_empty() {
            return Err("Description is required".to_owned());
        }
        if self.title.chars().count() > 200 || self.salary.chars().count() > 100 {
            return Err("Title or salary is too long".to_owned());
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Banner {
    pub id: BannerId,
    pub title: String,
    pub description: String,
    pub image: String,
    pub link: String,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Partner {
    pub id: PartnerId,
    pub name: String,
    pub logo: Option<String>,
    pub website: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CompanyInfo {
    pub name: String,
    pub description: String,
    pub founded_year: Option<i32>,
    pub requisites: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct HistoryEntry {
    pub id: HistoryEntryId,
    pub year: i32,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PromoCode {
    pub id: PromoCodeId,
    pub code: String,
    pub discount_percent: i32,
    pub active: bool,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
}

impl PromoCode {
    #[must_use]
    pub const fn window(&self) -> PromoWindow {
        PromoWindow {
            active: self.active,
            valid_from: self.valid_from,
            valid_to: self.valid_to,
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PickupPoint {
    pub id: PickupPointId,
    pub name: String,
    pub address: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_vacancy_checkbox() {
        let mut form = NewVacancy {
            title: "Bookseller".to_owned(),
            description: "Help readers".to_owned(),
            ..NewVacancy::default()
        };
        assert!(!form.active());
        form.is_active = Some("on".to_owned());
        assert!(form.active());
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_vacancy_requires_title() {
        let form = NewVacancy {
            title: "  ".to_owned(),
            description: "x".to_owned(),
            ..NewVacancy::default()
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_promo_window_from_row() {
        let code = PromoCode {
            id: PromoCodeId::new(1),
            code: "BOOKS10".to_owned(),
            discount_percent: 10,
            active: true,
            valid_from: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            valid_to: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
        };
        assert!(code.window().is_valid_on(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()));
    }
}
