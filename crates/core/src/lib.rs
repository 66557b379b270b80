//! HeavyShop Core - Shared domain types and rules.
//!
//! This crate provides the types used across all HeavyShop components:
//! - `storefront` - Public bookstore site, REST API and staff admin pages
//! - `cli` - Command-line tools for migrations, seeding and statistics
//!
//! # Architecture
//!
//! The core crate contains only types and pure business rules - no I/O, no
//! database access, no HTTP clients. Repositories in the storefront crate
//! load rows, hand them to these rules, and persist the outcome.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, phones, ratings, money
//! - [`cart`] - Stock checks and cart totals
//! - [`pricing`] - Order quotes and promo code windows
//! - [`catalog`] - Book search filters, sorting and pagination
//! - [`stats`] - Mean/median and monthly sales series

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod pricing;
pub mod stats;
pub mod types;

pub use types::*;
