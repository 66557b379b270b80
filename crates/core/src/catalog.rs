//! Catalog query parameters: filters, sorting and pagination.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::GenreId;

/// Sort order of book listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BookSort {
    #[default]
    TitleAsc,
    TitleDesc,
    PriceAsc,
    PriceDesc,
    NewestFirst,
    OldestFirst,
}

impl BookSort {
    /// Parse a `sort_by` value; unknown values fall back to title order.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "-title" => Self::TitleDesc,
            "price" => Self::PriceAsc,
            "-price" => Self::PriceDesc,
            "created_at" => Self::OldestFirst,
            "-created_at" => Self::NewestFirst,
            _ => Self::TitleAsc,
        }
    }

    /// The query-string form of this order.
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::TitleAsc => "title",
            Self::TitleDesc => "-title",
            Self::PriceAsc => "price",
            Self::PriceDesc => "-price",
            Self::OldestFirst => "created_at",
            Self::NewestFirst => "-created_at",
        }
    }

    /// `ORDER BY` body for the `books b` alias. Always one of a fixed set.
    #[must_use]
    pub const fn order_by_sql(self) -> &'static str {
        match self {
            Self::TitleAsc => "b.title ASC, b.id ASC",
            Self::TitleDesc => "b.title DESC, b.id DESC",
            Self::PriceAsc => "b.price ASC, b.id ASC",
            Self::PriceDesc => "b.price DESC, b.id DESC",
            Self::OldestFirst => "b.created_at ASC, b.id ASC",
            Self::NewestFirst => "b.created_at DESC, b.id DESC",
        }
    }

    /// All orders with their labels, for sort dropdowns.
    #[must_use]
    pub const fn options() -> [(Self, &'static str); 6] {
        [
            (Self::TitleAsc, "Title (A-Z)"),
            (Self::TitleDesc, "Title (Z-A)"),
            (Self::PriceAsc, "Price (low to high)"),
            (Self::PriceDesc, "Price (high to low)"),
            (Self::NewestFirst, "Newest first"),
            (Self::OldestFirst, "Oldest first"),
        ]
    }
}

/// Raw catalog query-string values as they arrive from a form or API call.
#[derive(Debug, Clone, Default)]
pub struct BookQuery {
    pub search: Option<String>,
    pub genres: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort_by: Option<String>,
}

/// Parsed catalog filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    /// Substring matched against title, author names, description and ISBN.
    pub search: Option<String>,
    pub genre_ids: Vec<GenreId>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: BookSort,
}

impl BookFilter {
    /// Build a filter, dropping values that do not parse.
    #[must_use]
    pub fn from_query(query: &BookQuery) -> Self {
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);

        Self {
            search,
            genre_ids: parse_id_list(query.genres.as_deref().unwrap_or_default()),
            min_price: parse_price(query.min_price.as_deref()),
            max_price: parse_price(query.max_price.as_deref()),
            sort: query
                .sort_by
                .as_deref()
                .map(BookSort::parse)
                .unwrap_or_default(),
        }
    }

    /// `%term%` pattern for `ILIKE`, with LIKE wildcards escaped.
    #[must_use]
    pub fn like_pattern(&self) -> Option<String> {
        self.search.as_ref().map(|s| {
            let escaped = s
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{escaped}%")
        })
    }
}

fn parse_id_list(csv: &str) -> Vec<GenreId> {
    let mut ids: Vec<GenreId> = csv
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|part| part.parse::<i32>().ok())
        .map(GenreId::new)
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn parse_price(raw: Option<&str>) -> Option<Decimal> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<Decimal>().ok())
        .filter(|d| !d.is_sign_negative())
}

/// Requested page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub const DEFAULT_SIZE: u32 = 20;
    pub const MAX_SIZE: u32 = 100;

    /// Clamp raw values: page starts at 1, size defaults to 20 and caps at 100.
    #[must_use]
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .filter(|s| *s > 0)
                .unwrap_or(Self::DEFAULT_SIZE)
                .min(Self::MAX_SIZE),
        }
    }

    #[must_use]
    pub fn limit(self) -> i64 {
        i64::from(self.page_size)
    }

    #[must_use]
    pub fn offset(self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results in the `{count, page, pages, results}` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: i64,
    pub page: u32,
    pub pages: u32,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(results: Vec<T>, count: i64, request: PageRequest) -> Self {
        let size = i64::from(request.page_size.max(1));
        let pages = u32::try_from((count.max(0) + size - 1) / size).unwrap_or(u32::MAX);
        Self {
            count,
            page: request.page,
            pages,
            results,
        }
    }

    /// Cut one page out of a list that is already loaded in full.
    #[must_use]
    pub fn from_all(all: Vec<T>, request: PageRequest) -> Self {
        let count = i64::try_from(all.len()).unwrap_or(i64::MAX);
        let skip = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(request.page_size).unwrap_or(usize::MAX);
        let results = all.into_iter().skip(skip).take(take).collect();
        Self::new(results, count, request)
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.pages
    }

    /// Convert every result, keeping the paging numbers.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            page: self.page,
            pages: self.pages,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_fallback() {
        assert_eq!(BookSort::parse("-price"), BookSort::PriceDesc);
        assert_eq!(BookSort::parse("-created_at"), BookSort::NewestFirst);
        assert_eq!(BookSort::parse("rating; DROP TABLE books"), BookSort::TitleAsc);
        assert_eq!(BookSort::parse(""), BookSort::TitleAsc);
    }

    #[test]
    fn test_sort_param_parses_back() {
        for (sort, _) in BookSort::options() {
            assert_eq!(BookSort::parse(sort.as_param()), sort);
        }
    }

    #[test]
    fn test_filter_ignores_bad_values() {
        let query = BookQuery {
            search: Some("  tolstoy ".into()),
            genres: Some("3,abc, 1,,3".into()),
            min_price: Some("ten".into()),
            max_price: Some("25.50".into()),
            sort_by: Some("price".into()),
        };
        let filter = BookFilter::from_query(&query);
        assert_eq!(filter.search.as_deref(), Some("tolstoy"));
        assert_eq!(filter.genre_ids, vec![GenreId::new(1), GenreId::new(3)]);
        assert_eq!(filter.min_price, None);
        assert_eq!(filter.max_price, Some(Decimal::new(2550, 2)));
        assert_eq!(filter.sort, BookSort::PriceAsc);
    }

    #[test]
    fn test_genre_ids_must_be_plain_digits() {
        let filter = BookFilter::from_query(&BookQuery {
            genres: Some("-3,+4,5, 7 ,0x8".into()),
            ..BookQuery::default()
        });
        assert_eq!(filter.genre_ids, vec![GenreId::new(5), GenreId::new(7)]);
    }

    #[test]
    fn test_blank_search_is_none() {
        let filter = BookFilter::from_query(&BookQuery {
            search: Some("   ".into()),
            ..BookQuery::default()
        });
        assert!(filter.search.is_none());
        assert!(filter.like_pattern().is_none());
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        let filter = BookFilter {
            search: Some("100%_off".into()),
            ..BookFilter::default()
        };
        assert_eq!(filter.like_pattern().as_deref(), Some("%100\\%\\_off%"));
    }

    #[test]
    fn test_page_request_clamps() {
        let req = PageRequest::new(Some(0), Some(500));
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, 100);
        assert_eq!(PageRequest::new(None, Some(0)).page_size, 20);
        assert_eq!(PageRequest::new(Some(3), Some(10)).offset(), 20);
    }

    #[test]
    fn test_page_count() {
        let req = PageRequest::new(Some(1), Some(20));
        assert_eq!(Page::new(Vec::<i32>::new(), 0, req).pages, 0);
        assert_eq!(Page::new(vec![1], 20, req).pages, 1);
        let page = Page::new(vec![1], 21, req);
        assert_eq!(page.pages, 2);
        assert!(page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_page_from_all() {
        let page = Page::from_all((1..=45).collect(), PageRequest::new(Some(3), Some(20)));
        assert_eq!(page.count, 45);
        assert_eq!(page.pages, 3);
        assert_eq!(page.results, vec![41, 42, 43, 44, 45]);

        let past_end = Page::from_all(vec![1, 2], PageRequest::new(Some(5), None));
        assert!(past_end.results.is_empty());
        assert_eq!(past_end.count, 2);
    }
}
