//! Cart and checkout tests: stock rules and order totals.
//!
//! Run with: cargo test -p heavyshop-integration-tests -- --ignored

use heavyshop_integration_tests::{base_url, create_book, customer_client, decimal, staff_client};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde_json::{Value, json};

async fn add_to_cart(client: &Client, book: &Value, quantity: i32) -> reqwest::Response {
    client
        .post(format!("{}/api/cart/add", base_url()))
        .json(&json!({ "book_id": book["id"], "quantity": quantity }))
        .send()
        .await
        .expect("Failed to add to cart")
}

// ============================================================================
// Stock
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_out_of_stock_book_cannot_be_added() {
    let staff = staff_client().await;
    let book = create_book(&staff, "12.00", 0).await;
    let customer = customer_client().await;

    let resp = add_to_cart(&customer, &book, 1).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["error"], "Book is out of stock");

    let cart: Value = customer
        .get(format!("{}/api/cart", base_url()))
        .send()
        .await
        .expect("Failed to get cart")
        .json()
        .await
        .expect("Invalid JSON");
    assert_eq!(cart["total_items"], 0);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_cart_cannot_exceed_stock() {
    let staff = staff_client().await;
    let book = create_book(&staff, "12.00", 2).await;
    let customer = customer_client().await;

    assert_eq!(add_to_cart(&customer, &book, 2).await.status(), StatusCode::OK);
    let resp = add_to_cart(&customer, &book, 1).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_updating_line_not_in_cart_is_not_found() {
    let staff = staff_client().await;
    let book = create_book(&staff, "12.00", 1).await;
    let customer = customer_client().await;

    // More than stock, but the line does not exist at all
    let resp = customer
        .put(format!("{}/api/cart/update/{}", base_url(), book["id"]))
        .json(&json!({ "quantity": 5 }))
        .send()
        .await
        .expect("Failed to update cart");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_order_total_is_sum_of_lines() {
    let staff = staff_client().await;
    let first = create_book(&staff, "14.50", 5).await;
    let second = create_book(&staff, "3.35", 5).await;
    let customer = customer_client().await;

    assert_eq!(add_to_cart(&customer, &first, 2).await.status(), StatusCode::OK);
    assert_eq!(add_to_cart(&customer, &second, 3).await.status(), StatusCode::OK);

    let resp = customer
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({ "shipping_address": "Minsk, Nezavisimosti 4" }))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = resp.json().await.expect("Invalid JSON");

    let items = order["items"].as_array().expect("items");
    assert_eq!(items.len(), 2);
    let expected: Decimal = items
        .iter()
        .map(|item| {
            decimal(&item["price"]) * Decimal::from(item["quantity"].as_i64().expect("quantity"))
        })
        .sum();
    assert_eq!(expected, Decimal::new(3905, 2));
    assert_eq!(decimal(&order["subtotal"]), expected);
    assert_eq!(decimal(&order["total"]), expected);

    // Stock was taken and the cart emptied
    let book: Value = customer
        .get(format!("{}/api/books/{}", base_url(), first["id"]))
        .send()
        .await
        .expect("Failed to get book")
        .json()
        .await
        .expect("Invalid JSON");
    assert_eq!(book["quantity"], 3);

    let cart: Value = customer
        .get(format!("{}/api/cart", base_url()))
        .send()
        .await
        .expect("Failed to get cart")
        .json()
        .await
        .expect("Invalid JSON");
    assert_eq!(cart["total_items"], 0);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_empty_cart_cannot_be_ordered() {
    let customer = customer_client().await;

    let resp = customer
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({ "shipping_address": "Minsk" }))
        .send()
        .await
        .expect("Failed to post order");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_unknown_promo_code_is_rejected() {
    let staff = staff_client().await;
    let book = create_book(&staff, "10.00", 5).await;
    let customer = customer_client().await;
    assert_eq!(add_to_cart(&customer, &book, 1).await.status(), StatusCode::OK);

    let resp = customer
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({ "shipping_address": "Minsk", "promo_code": "NO-SUCH-CODE" }))
        .send()
        .await
        .expect("Failed to post order");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
