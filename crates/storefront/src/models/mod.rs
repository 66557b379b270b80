//! Domain models for the storefront.
//!
//! Row types derive `sqlx::FromRow` and `Serialize` so the same struct feeds
//! both templates and the JSON API. Input types derive `Deserialize` and
//! carry their own `validate` step.

pub mod book;
pub mod cart;
pub mod content;
pub mod customer;
pub mod order;
pub mod review;
pub mod session;
pub mod stats;
pub mod user;

pub use book::{Author, Book, Genre, NewAuthor, NewBook, NewGenre, NewPublisher, Publisher};
pub use cart::{CartItemView, CartView};
pub use content::{
    Article, Banner, CompanyInfo, Employee, Faq, HistoryEntry, NewArticle, NewVacancy, Partner,
    PickupPoint, PromoCode, Term, Vacancy,
};
pub use customer::{Customer, CustomerProfileInput};
pub use order::{CheckoutRequest, Order, OrderDetail, OrderItem, OrderSummary};
pub use review::{CustomerReview, NewCustomerReview, NewReview, Review};
pub use session::{CurrentUser, keys as session_keys};
pub use stats::{GenreStat, SalesOverview, SalesSnapshot, StatisticsReport, TopBook};
pub use user::User;
