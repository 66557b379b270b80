//! Core types for HeavyShop.
//!
//! Validated wrappers for the values that cross the HTTP boundary. Parsing
//! happens once at the edge; everything downstream works with these types.

pub mod age;
pub mod email;
pub mod id;
pub mod isbn;
pub mod money;
pub mod phone;
pub mod rating;
pub mod status;
pub mod username;

pub use age::{AgeError, MIN_AGE, age_on, require_adult};
pub use email::{Email, EmailError};
pub use id::*;
pub use isbn::{Isbn, IsbnError};
pub use money::{
    DEFAULT_CURRENCY, currency, format_price, format_price_in, line_total, round_money,
    set_currency,
};
pub use phone::{Phone, PhoneError};
pub use rating::{Rating, RatingError};
pub use status::*;
pub use username::{Username, UsernameError};
