//! Catalog API tests: book creation and lookup.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (hs-cli migrate)
//! - The storefront running (cargo run -p heavyshop-storefront)
//! - A staff account (hs-cli staff create)
//!
//! Run with: cargo test -p heavyshop-integration-tests -- --ignored

use heavyshop_integration_tests::{
    base_url, client, create_book, create_taxonomy, decimal, staff_client, unique, unique_isbn,
};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::{Value, json};

// ============================================================================
// Create & Retrieve
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_created_book_is_retrievable_by_id() {
    let staff = staff_client().await;
    let (author_id, genre_id, publisher_id) = create_taxonomy(&staff).await;
    let title = unique("Earthsea ");

    let resp = staff
        .post(format!("{}/api/books", base_url()))
        .json(&json!({
            "title": title,
            "author_ids": [author_id],
            "genre_ids": [genre_id],
            "publisher_id": publisher_id,
            "isbn": unique_isbn(),
            "price": "14.50",
            "quantity": 3,
        }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.expect("Invalid JSON");
    let id = created["id"].as_i64().expect("book id");

    // Anyone may read the catalog
    let resp = client()
        .get(format!("{}/api/books/{id}", base_url()))
        .send()
        .await
        .expect("Failed to get book");
    assert_eq!(resp.status(), StatusCode::OK);
    let book: Value = resp.json().await.expect("Invalid JSON");

    assert_eq!(book["title"], title);
    assert_eq!(decimal(&book["price"]), Decimal::new(1450, 2));
    assert_eq!(book["quantity"], 3);
    assert_eq!(book["authors"][0]["id"], author_id);
    assert_eq!(book["genres"][0]["id"], genre_id);
    assert_eq!(book["publisher"]["id"], publisher_id);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_book_list_filters_by_genre() {
    let staff = staff_client().await;
    let book = create_book(&staff, "9.99", 1).await;
    let genre_id = book["genres"][0]["id"].as_i64().expect("genre id");

    let resp = client()
        .get(format!("{}/api/books?genres={genre_id}", base_url()))
        .send()
        .await
        .expect("Failed to list books");
    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = resp.json().await.expect("Invalid JSON");

    assert_eq!(page["count"], 1);
    assert_eq!(page["results"][0]["id"], book["id"]);
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_book_with_unknown_author_is_rejected() {
    let staff = staff_client().await;

    let resp = staff
        .post(format!("{}/api/books", base_url()))
        .json(&json!({
            "title": unique("Orphan "),
            "author_ids": [i32::MAX],
            "isbn": unique_isbn(),
            "price": "10.00",
        }))
        .send()
        .await
        .expect("Failed to post book");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_book_without_author_is_rejected() {
    let staff = staff_client().await;

    let resp = staff
        .post(format!("{}/api/books", base_url()))
        .json(&json!({
            "title": unique("Anonymous "),
            "isbn": unique_isbn(),
            "price": "10.00",
        }))
        .send()
        .await
        .expect("Failed to post book");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["error"], "A book needs at least one author");
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_missing_book_is_not_found() {
    let resp = client()
        .get(format!("{}/api/books/{}", base_url(), i32::MAX))
        .send()
        .await
        .expect("Failed to get book");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
