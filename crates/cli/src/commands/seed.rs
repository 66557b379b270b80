//! Seed an empty database from a YAML fixture file.
//!
//! Books refer to their authors, genres and publisher by name; names are
//! resolved against the entries created earlier in the same file. Catalog
//! rows go through the storefront repositories so the same validation
//! applies as in the staff API. Company content without a repository
//! write path is inserted in one transaction.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use heavyshop_core::{AuthorId, GenreId, PublisherId};
use heavyshop_storefront::db::{BookRepository, ContentRepository, TaxonomyRepository};
use heavyshop_storefront::models::{
    NewArticle, NewAuthor, NewBook, NewGenre, NewPublisher, NewVacancy,
};

use super::{CommandError, connect};

/// Top-level layout of the fixture file. Every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Fixtures {
    pub authors: Vec<NewAuthor>,
    pub genres: Vec<NewGenre>,
    pub publishers: Vec<NewPublisher>,
    pub books: Vec<BookFixture>,
    pub company: Option<CompanyFixture>,
    pub history: Vec<HistoryFixture>,
    pub articles: Vec<NewArticle>,
    pub terms: Vec<TermFixture>,
    pub faqs: Vec<FaqFixture>,
    pub employees: Vec<EmployeeFixture>,
    pub vacancies: Vec<NewVacancy>,
    pub banners: Vec<BannerFixture>,
    pub partners: Vec<PartnerFixture>,
    pub promo_codes: Vec<PromoFixture>,
    pub pickup_points: Vec<PickupFixture>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookFixture {
    pub title: String,
    pub authors: Vec<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub publisher: Option<String>,
    pub isbn: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub quantity: i32,
    pub cover: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompanyFixture {
    pub name: String,
    pub description: String,
    pub founded_year: Option<i32>,
    #[serde(default)]
    pub requisites: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryFixture {
    pub year: i32,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TermFixture {
    pub term: String,
    pub definition: String,
}

#[derive(Debug, Deserialize)]
pub struct FaqFixture {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct EmployeeFixture {
    pub name: String,
    pub position: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    pub photo: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct BannerFixture {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub image: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Deserialize)]
pub struct PartnerFixture {
    pub name: String,
    pub logo: Option<String>,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct PromoFixture {
    pub code: String,
    pub discount_percent: i32,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct PickupFixture {
    pub name: String,
    pub address: String,
}

/// Name-to-id lookups for the taxonomy created by this run.
#[derive(Debug, Default)]
pub struct Taxonomy {
    pub authors: HashMap<String, AuthorId>,
    pub genres: HashMap<String, GenreId>,
    pub publishers: HashMap<String, PublisherId>,
}

impl BookFixture {
    /// Resolve names to ids and apply the catalog rules.
    pub fn resolve(&self, taxonomy: &Taxonomy) -> Result<NewBook, String> {
        let author_ids = self
            .authors
            .iter()
            .map(|name| {
                taxonomy
                    .authors
                    .get(name.trim())
                    .copied()
                    .ok_or_else(|| format!("{}: unknown author {name}", self.title))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let genre_ids = self
            .genres
            .iter()
            .map(|name| {
                taxonomy
                    .genres
                    .get(name.trim())
                    .copied()
                    .ok_or_else(|| format!("{}: unknown genre {name}", self.title))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let publisher_id = match &self.publisher {
            Some(name) => Some(
                taxonomy
                    .publishers
                    .get(name.trim())
                    .copied()
                    .ok_or_else(|| format!("{}: unknown publisher {name}", self.title))?,
            ),
            None => None,
        };

        NewBook {
            title: self.title.clone(),
            author_ids,
            genre_ids,
            publisher_id,
            isbn: self.isbn.clone(),
            description: self.description.clone(),
            price: self.price,
            quantity: self.quantity,
            cover: self.cover.clone(),
        }
        .validate()
        .map_err(|e| format!("{}: {e}", self.title))
    }
}

/// Parse a fixture file's contents.
pub fn parse(content: &str) -> Result<Fixtures, CommandError> {
    serde_yaml::from_str(content).map_err(|e| CommandError::Fixtures(e.to_string()))
}

/// Load `path` into an empty database.
pub async fn run(path: &Path) -> Result<(), CommandError> {
    tracing::info!(path = %path.display(), "Loading fixtures from file");
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CommandError::Fixtures(format!("{}: {e}", path.display())))?;
    let fixtures = parse(&content)?;

    let pool = connect().await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(&pool)
        .await?;
    if existing > 0 {
        return Err(CommandError::Fixtures(format!(
            "database already has {existing} books; seed expects an empty catalog"
        )));
    }

    let taxonomy = seed_taxonomy(&pool, &fixtures).await?;
    seed_books(&pool, &fixtures.books, &taxonomy).await?;
    seed_content(&pool, &fixtures).await?;

    tracing::info!("Seeding complete!");
    Ok(())
}

async fn seed_taxonomy(pool: &PgPool, fixtures: &Fixtures) -> Result<Taxonomy, CommandError> {
    let repo = TaxonomyRepository::new(pool);
    let mut taxonomy = Taxonomy::default();

    for input in &fixtures.authors {
        let author = repo.create_author(input.clone()).await?;
        taxonomy.authors.insert(author.name, author.id);
    }
    for input in &fixtures.genres {
        let genre = repo.create_genre(input.clone()).await?;
        taxonomy.genres.insert(genre.name, genre.id);
    }
    for input in &fixtures.publishers {
        let publisher = repo.create_publisher(input.clone()).await?;
        taxonomy.publishers.insert(publisher.name, publisher.id);
    }

    tracing::info!(
        authors = taxonomy.authors.len(),
        genres = taxonomy.genres.len(),
        publishers = taxonomy.publishers.len(),
        "Taxonomy created"
    );
    Ok(taxonomy)
}

async fn seed_books(
    pool: &PgPool,
    books: &[BookFixture],
    taxonomy: &Taxonomy,
) -> Result<(), CommandError> {
    // Resolve everything first so a typo doesn't leave half a catalog
    let resolved = books
        .iter()
        .map(|book| book.resolve(taxonomy))
        .collect::<Result<Vec<_>, _>>()
        .map_err(CommandError::Fixtures)?;

    let repo = BookRepository::new(pool);
    for book in &resolved {
        repo.create(book).await?;
    }
    tracing::info!(books = resolved.len(), "Books created");
    Ok(())
}

async fn seed_content(pool: &PgPool, fixtures: &Fixtures) -> Result<(), CommandError> {
    let content = ContentRepository::new(pool);
    for article in &fixtures.articles {
        let article = article.clone().validate().map_err(CommandError::Fixtures)?;
        content.create_article(&article).await?;
    }
    for vacancy in &fixtures.vacancies {
        let vacancy = vacancy.clone().validate().map_err(CommandError::Fixtures)?;
        content.create_vacancy(&vacancy).await?;
    }

    let mut tx = pool.begin().await?;

    if let Some(company) = &fixtures.company {
        sqlx::query(
            "INSERT INTO company_info (name, description, founded_year, requisites)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&company.name)
        .bind(&company.description)
        .bind(company.founded_year)
        .bind(&company.requisites)
        .execute(&mut *tx)
        .await?;
    }
    for entry in &fixtures.history {
        sqlx::query(
            "INSERT INTO company_history (year, title, description, image)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(entry.year)
        .bind(&entry.title)
        .bind(&entry.description)
        .bind(&entry.image)
        .execute(&mut *tx)
        .await?;
    }
    for term in &fixtures.terms {
        sqlx::query("INSERT INTO terms (term, definition) VALUES ($1, $2)")
            .bind(&term.term)
            .bind(&term.definition)
            .execute(&mut *tx)
            .await?;
    }
    for faq in &fixtures.faqs {
        sqlx::query("INSERT INTO faqs (question, answer, category) VALUES ($1, $2, $3)")
            .bind(&faq.question)
            .bind(&faq.answer)
            .bind(&faq.category)
            .execute(&mut *tx)
            .await?;
    }
    for employee in &fixtures.employees {
        sqlx::query(
            "INSERT INTO employees (name, photo, position, description, phone, email, birth_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&employee.name)
        .bind(&employee.photo)
        .bind(&employee.position)
        .bind(&employee.description)
        .bind(&employee.phone)
        .bind(&employee.email)
        .bind(employee.birth_date)
        .execute(&mut *tx)
        .await?;
    }
    for banner in &fixtures.banners {
        sqlx::query(
            "INSERT INTO banners (title, description, image, link, sort_order)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&banner.title)
        .bind(&banner.description)
        .bind(&banner.image)
        .bind(&banner.link)
        .bind(banner.sort_order)
        .execute(&mut *tx)
        .await?;
    }
    for partner in &fixtures.partners {
        sqlx::query(
            "INSERT INTO partners (name, logo, website, description) VALUES ($1, $2, $3, $4)",
        )
        .bind(&partner.name)
        .bind(&partner.logo)
        .bind(&partner.website)
        .bind(&partner.description)
        .execute(&mut *tx)
        .await?;
    }
    for promo in &fixtures.promo_codes {
        sqlx::query(
            "INSERT INTO promo_codes (code, discount_percent, valid_from, valid_to)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(promo.code.to_uppercase())
        .bind(promo.discount_percent)
        .bind(promo.valid_from)
        .bind(promo.valid_to)
        .execute(&mut *tx)
        .await?;
    }
    for point in &fixtures.pickup_points {
        sqlx::query("INSERT INTO pickup_points (name, address) VALUES ($1, $2)")
            .bind(&point.name)
            .bind(&point.address)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    tracing::info!(
        articles = fixtures.articles.len(),
        faqs = fixtures.faqs.len(),
        promo_codes = fixtures.promo_codes.len(),
        "Content created"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const BUNDLED: &str = include_str!("../../../../fixtures/bookstore.yaml");

    fn taxonomy_for(fixtures: &Fixtures) -> Taxonomy {
        let mut taxonomy = Taxonomy::default();
        for (i, author) in (1_i32..).zip(&fixtures.authors) {
            taxonomy.authors.insert(author.name.clone(), AuthorId::from(i));
        }
        for (i, genre) in (1_i32..).zip(&fixtures.genres) {
            taxonomy.genres.insert(genre.name.clone(), GenreId::from(i));
        }
        for (i, publisher) in (1_i32..).zip(&fixtures.publishers) {
            taxonomy
                .publishers
                .insert(publisher.name.clone(), PublisherId::from(i));
        }
        taxonomy
    }

    #[test]
    fn test_bundled_fixtures_resolve() {
        let fixtures = parse(BUNDLED).unwrap();
        assert!(!fixtures.books.is_empty());
        let taxonomy = taxonomy_for(&fixtures);
        for book in &fixtures.books {
            let resolved = book.resolve(&taxonomy);
            assert!(resolved.is_ok(), "{resolved:?}");
        }
        for vacancy in &fixtures.vacancies {
            assert!(vacancy.clone().validate().is_ok());
        }
    }

    #[test]
    fn test_unknown_author_is_reported() {
        let fixtures = parse(
            r#"
authors:
  - name: Known Author
books:
  - title: Orphan
    authors: [Nobody]
    isbn: "9780000000001"
    price: "10.00"
"#,
        )
        .unwrap();
        let err = fixtures.books[0]
            .resolve(&taxonomy_for(&fixtures))
            .unwrap_err();
        assert_eq!(err, "Orphan: unknown author Nobody");
    }

    #[test]
    fn test_book_rules_apply_to_fixtures() {
        let fixtures = parse(
            r#"
authors:
  - name: A
books:
  - title: Bad ISBN
    authors: [A]
    isbn: "123"
    price: "10.00"
"#,
        )
        .unwrap();
        let err = fixtures.books[0]
            .resolve(&taxonomy_for(&fixtures))
            .unwrap_err();
        assert!(err.starts_with("Bad ISBN: ISBN must have 10 or 13"));
    }

    #[test]
    fn test_empty_file_is_valid() {
        let fixtures = parse("{}").unwrap();
        assert!(fixtures.books.is_empty());
        assert!(fixtures.company.is_none());
    }
}
