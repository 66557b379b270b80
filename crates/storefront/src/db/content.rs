//! Company content: news, glossary, FAQ, staff, vacancies, marketing blocks,
//! promo codes and pickup points.

use chrono::NaiveDate;
use sqlx::PgPool;

use heavyshop_core::pricing::partition_by_validity;
use heavyshop_core::{ArticleId, VacancyId};

use super::RepositoryError;
use crate::models::{
    Article, Banner, CompanyInfo, Employee, Faq, HistoryEntry, NewArticle, NewVacancy, Partner,
    PickupPoint, PromoCode, Term, Vacancy,
};

const ARTICLE_COLUMNS: &str = "id, title, summary, content, image, published_at";
const VACANCY_COLUMNS: &str =
    "id, title, description, requirements, salary, is_active, created_at, updated_at";

fn contains_pattern(search: Option<&str>) -> Option<String> {
    search.map(str::trim).filter(|s| !s.is_empty()).map(|s| {
        format!(
            "%{}%",
            s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
        )
    })
}

pub struct ContentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContentRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Articles
    // =========================================================================

    /// Articles, newest first, optionally matching a title/summary substring.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn articles(&self, search: Option<&str>) -> Result<Vec<Article>, RepositoryError> {
        let articles = sqlx::query_as::<_, Article>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles
             WHERE $1::TEXT IS NULL OR title ILIKE $1 OR summary ILIKE $1
             ORDER BY published_at DESC, id DESC"
        ))
        .bind(contains_pattern(search))
        .fetch_all(self.pool)
        .await?;
        Ok(articles)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest_article(&self) -> Result<Option<Article>, RepositoryError> {
        let article = sqlx::query_as::<_, Article>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY published_at DESC, id DESC LIMIT 1"
        ))
        .fetch_optional(self.pool)
        .await?;
        Ok(article)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn article(&self, id: ArticleId) -> Result<Option<Article>, RepositoryError> {
        let article = sqlx::query_as::<_, Article>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(article)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_article(&self, input: &NewArticle) -> Result<Article, RepositoryError> {
        let article = sqlx::query_as::<_, Article>(&format!(
            "INSERT INTO articles (title, summary, content, image) VALUES ($1, $2, $3, $4)
             RETURNING {ARTICLE_COLUMNS}"
        ))
        .bind(&input.title)
        .bind(&input.summary)
        .bind(&input.content)
        .bind(input.image.as_deref().filter(|i| !i.is_empty()))
        .fetch_one(self.pool)
        .await?;
        Ok(article)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the article doesn't exist.
    pub async fn update_article(
        &self,
        id: ArticleId,
        input: &NewArticle,
    ) -> Result<Article, RepositoryError> {
        sqlx::query_as::<_, Article>(&format!(
            "UPDATE articles SET title = $2, summary = $3, content = $4, image = $5
             WHERE id = $1
             RETURNING {ARTICLE_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.title)
        .bind(&input.summary)
        .bind(&input.content)
        .bind(input.image.as_deref().filter(|i| !i.is_empty()))
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the article doesn't exist.
    pub async fn delete_article(&self, id: ArticleId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // =========================================================================
    // Glossary and FAQ
    // =========================================================================

    /// Glossary terms in alphabetical order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn terms(&self, search: Option<&str>) -> Result<Vec<Term>, RepositoryError> {
        let terms = sqlx::query_as::<_, Term>(
            "SELECT id, term, definition, added_at FROM terms
             WHERE $1::TEXT IS NULL OR term ILIKE $1 OR definition ILIKE $1
             ORDER BY term, id",
        )
        .bind(contains_pattern(search))
        .fetch_all(self.pool)
        .await?;
        Ok(terms)
    }

    /// Published FAQ entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn faqs(
        &self,
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<Faq>, RepositoryError> {
        let faqs = sqlx::query_as::<_, Faq>(
            "SELECT id, question, answer, category, created_at FROM faqs
             WHERE is_published
               AND ($1::TEXT IS NULL OR category = $1)
               AND ($2::TEXT IS NULL OR question ILIKE $2 OR answer ILIKE $2)
             ORDER BY created_at DESC, id DESC",
        )
        .bind(category.map(str::trim).filter(|c| !c.is_empty()))
        .bind(contains_pattern(search))
        .fetch_all(self.pool)
        .await?;
        Ok(faqs)
    }

    // =========================================================================
    // People
    // =========================================================================

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn employees(&self) -> Result<Vec<Employee>, RepositoryError> {
        let employees = sqlx::query_as::<_, Employee>(
            "SELECT id, name, photo, position, description, phone, email
             FROM employees ORDER BY name, id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(employees)
    }

    /// Open vacancies, or every vacancy for staff screens.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn vacancies(&self, include_inactive: bool) -> Result<Vec<Vacancy>, RepositoryError> {
        let vacancies = sqlx::query_as::<_, Vacancy>(&format!(
            "SELECT {VACANCY_COLUMNS} FROM vacancies
             WHERE is_active OR $1
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(include_inactive)
        .fetch_all(self.pool)
        .await?;
        Ok(vacancies)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn vacancy(&self, id: VacancyId) -> Result<Option<Vacancy>, RepositoryError> {
        let vacancy = sqlx::query_as::<_, Vacancy>(&format!(
            "SELECT {VACANCY_COLUMNS} FROM vacancies WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(vacancy)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_vacancy(&self, input: &NewVacancy) -> Result<Vacancy, RepositoryError> {
        let vacancy = sqlx::query_as::<_, Vacancy>(&format!(
            "INSERT INTO vacancies (title, description, requirements, salary, is_active)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {VACANCY_COLUMNS}"
        ))
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.requirements.trim())
        .bind(input.salary.trim())
        .bind(input.active())
        .fetch_one(self.pool)
        .await?;
        Ok(vacancy)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the vacancy doesn't exist.
    pub async fn update_vacancy(
        &self,
        id: VacancyId,
        input: &NewVacancy,
    ) -> Result<Vacancy, RepositoryError> {
        sqlx::query_as::<_, Vacancy>(&format!(
            "UPDATE vacancies SET title = $2, description = $3, requirements = $4,
                 salary = $5, is_active = $6, updated_at = now()
             WHERE id = $1
             RETURNING {VACANCY_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.requirements.trim())
        .bind(input.salary.trim())
        .bind(input.active())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the vacancy doesn't exist.
    pub async fn delete_vacancy(&self, id: VacancyId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM vacancies WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // =========================================================================
    // Company and marketing
    // =========================================================================

    /// Active banners in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn banners(&self) -> Result<Vec<Banner>, RepositoryError> {
        let banners = sqlx::query_as::<_, Banner>(
            "SELECT id, title, description, image, link, sort_order FROM banners
             WHERE is_active ORDER BY sort_order, id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(banners)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn partners(&self) -> Result<Vec<Partner>, RepositoryError> {
        let partners = sqlx::query_as::<_, Partner>(
            "SELECT id, name, logo, website, description FROM partners
             WHERE is_active ORDER BY name, id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(partners)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn company_info(&self) -> Result<Option<CompanyInfo>, RepositoryError> {
        let info = sqlx::query_as::<_, CompanyInfo>(
            "SELECT name, description, founded_year, requisites FROM company_info
             ORDER BY id LIMIT 1",
        )
        .fetch_optional(self.pool)
        .await?;
        Ok(info)
    }

    /// Company timeline, most recent year first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn history(&self) -> Result<Vec<HistoryEntry>, RepositoryError> {
        let entries = sqlx::query_as::<_, HistoryEntry>(
            "SELECT id, year, title, description, image FROM company_history ORDER BY year DESC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(entries)
    }

    /// Promo codes split into `(valid today, archived)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn promo_codes(
        &self,
        today: NaiveDate,
    ) -> Result<(Vec<PromoCode>, Vec<PromoCode>), RepositoryError> {
        let codes = sqlx::query_as::<_, PromoCode>(
            "SELECT id, code, discount_percent, active, valid_from, valid_to
             FROM promo_codes ORDER BY valid_to DESC, id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(partition_by_validity(codes, today, PromoCode::window))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn pickup_points(&self) -> Result<Vec<PickupPoint>, RepositoryError> {
        let points = sqlx::query_as::<_, PickupPoint>(
            "SELECT id, name, address FROM pickup_points WHERE is_active ORDER BY name, id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(points)
    }
}
