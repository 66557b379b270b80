//! Integration tests for HeavyShop.
//!
//! # Running Tests
//!
//! ```bash
//! # Database, schema and a staff account
//! hs-cli migrate
//! hs-cli staff create -u manager -e manager@example.com -p manager2026
//!
//! # Server in another terminal
//! cargo run -p heavyshop-storefront
//!
//! # Black-box tests
//! cargo test -p heavyshop-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `HEAVYSHOP_TEST_URL` - storefront base URL (default `http://localhost:3000`)
//! - `HEAVYSHOP_TEST_STAFF_USERNAME` / `HEAVYSHOP_TEST_STAFF_PASSWORD` -
//!   staff login used for catalog writes (default `manager` / `manager2026`)
//!
//! Every helper creates uniquely named records, so the tests can run
//! against a database that already holds data.

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use uuid::Uuid;

/// Storefront base URL (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("HEAVYSHOP_TEST_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Short unique suffix for names that must not collide between runs.
#[must_use]
pub fn unique(prefix: &str) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(10).collect();
    format!("{prefix}{suffix}")
}

/// A 13-digit ISBN that is unlikely to repeat.
#[must_use]
pub fn unique_isbn() -> String {
    format!("978{:010}", Uuid::new_v4().as_u128() % 10_000_000_000)
}

/// Client with a cookie jar.
///
/// Each client claims its own forwarded address so the per-IP login
/// limiter doesn't throttle a whole test run.
#[must_use]
pub fn client() -> Client {
    let octet = Uuid::new_v4().as_u128() % 250 + 1;
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-forwarded-for",
        HeaderValue::from_str(&format!("198.51.100.{octet}")).expect("valid header"),
    );
    Client::builder()
        .cookie_store(true)
        .default_headers(headers)
        .build()
        .expect("Failed to create HTTP client")
}

/// Log `client` in through the login form.
pub async fn login(client: &Client, username: &str, password: &str) {
    let resp = client
        .post(format!("{}/auth/login", base_url()))
        .form(&[("username", username), ("password", password)])
        .send()
        .await
        .expect("Failed to log in");
    // Failed logins re-render the form instead of redirecting
    assert_ne!(resp.url().path(), "/auth/login", "login for {username} failed");
}

/// Client logged in as the configured staff account.
pub async fn staff_client() -> Client {
    let username = std::env::var("HEAVYSHOP_TEST_STAFF_USERNAME")
        .unwrap_or_else(|_| "manager".to_string());
    let password = std::env::var("HEAVYSHOP_TEST_STAFF_PASSWORD")
        .unwrap_or_else(|_| "manager2026".to_string());
    let client = client();
    login(&client, &username, &password).await;
    client
}

/// Register a fresh account; registration logs the client in.
pub async fn registered_client() -> (Client, String) {
    let client = client();
    let username = unique("reader");
    let resp = client
        .post(format!("{}/auth/register", base_url()))
        .form(&[
            ("username", username.as_str()),
            ("email", &format!("{username}@example.com")),
            ("password", "reader2026"),
            ("password_confirm", "reader2026"),
        ])
        .send()
        .await
        .expect("Failed to register");
    assert_ne!(resp.url().path(), "/auth/register", "registration failed");
    (client, username)
}

/// Registered account with a customer profile, ready to order and review.
pub async fn customer_client() -> Client {
    let (client, _) = registered_client().await;
    let resp = client
        .put(format!("{}/api/customer", base_url()))
        .json(&json!({
            "phone": "+375 (29) 123-45-67",
            "address": "Minsk, Nezavisimosti 4",
            "birth_date": "1990-05-17",
            "timezone": "Europe/Minsk",
        }))
        .send()
        .await
        .expect("Failed to save profile");
    assert_eq!(resp.status(), StatusCode::OK);
    client
}

/// Create an author, a genre and a publisher; returns their ids.
pub async fn create_taxonomy(staff: &Client) -> (i64, i64, i64) {
    let base = base_url();
    let mut ids = Vec::new();
    for (path, body) in [
        ("authors", json!({ "name": unique("Author ") })),
        ("genres", json!({ "name": unique("Genre ") })),
        ("publishers", json!({ "name": unique("Publisher ") })),
    ] {
        let resp = staff
            .post(format!("{base}/api/{path}"))
            .json(&body)
            .send()
            .await
            .expect("Failed to create taxonomy");
        assert_eq!(resp.status(), StatusCode::CREATED, "POST /api/{path}");
        let value: Value = resp.json().await.expect("Invalid JSON");
        ids.push(value["id"].as_i64().expect("id"));
    }
    let [author, genre, publisher] = <[i64; 3]>::try_from(ids).expect("three ids");
    (author, genre, publisher)
}

/// Create a book with its own taxonomy and return the response body.
pub async fn create_book(staff: &Client, price: &str, quantity: i32) -> Value {
    let (author_id, genre_id, publisher_id) = create_taxonomy(staff).await;
    let resp = staff
        .post(format!("{}/api/books", base_url()))
        .json(&json!({
            "title": unique("Book "),
            "author_ids": [author_id],
            "genre_ids": [genre_id],
            "publisher_id": publisher_id,
            "isbn": unique_isbn(),
            "description": "Created by the integration tests",
            "price": price,
            "quantity": quantity,
        }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.expect("Invalid JSON")
}

/// Read a decimal serialized as a JSON string.
#[must_use]
pub fn decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("not a decimal string: {value}"))
}
