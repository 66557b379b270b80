//! Review submission and moderation.
//!
//! Run with: cargo test -p heavyshop-integration-tests -- --ignored

use heavyshop_integration_tests::{
    base_url, create_book, customer_client, registered_client, staff_client,
};
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_rating_outside_range_is_rejected() {
    let staff = staff_client().await;
    let book = create_book(&staff, "10.00", 1).await;
    let customer = customer_client().await;
    let url = format!("{}/api/books/{}/reviews", base_url(), book["id"]);

    for rating in [0, 6, -1] {
        let resp = customer
            .post(&url)
            .json(&json!({ "rating": rating, "comment": "Out of range" }))
            .send()
            .await
            .expect("Failed to post review");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "rating {rating}");
    }

    let resp = customer
        .post(format!("{}/api/customer-reviews", base_url()))
        .json(&json!({ "rating": 9, "text": "Great shop" }))
        .send()
        .await
        .expect("Failed to post shop review");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_review_is_hidden_until_approved() {
    let staff = staff_client().await;
    let book = create_book(&staff, "10.00", 1).await;
    let customer = customer_client().await;
    let url = format!("{}/api/books/{}/reviews", base_url(), book["id"]);

    let resp = customer
        .post(&url)
        .json(&json!({ "rating": 5, "comment": "Could not put it down." }))
        .send()
        .await
        .expect("Failed to post review");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let review: Value = resp.json().await.expect("Invalid JSON");

    let listed: Value = customer
        .get(&url)
        .send()
        .await
        .expect("Failed to list reviews")
        .json()
        .await
        .expect("Invalid JSON");
    assert_eq!(listed["count"], 0);

    let resp = staff
        .post(format!("{}/api/reviews/{}/approve", base_url(), review["id"]))
        .send()
        .await
        .expect("Failed to approve review");
    assert_eq!(resp.status(), StatusCode::OK);

    let listed: Value = customer
        .get(&url)
        .send()
        .await
        .expect("Failed to list reviews")
        .json()
        .await
        .expect("Invalid JSON");
    assert_eq!(listed["count"], 1);
    assert_eq!(listed["results"][0]["rating"], 5);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_second_review_of_same_book_conflicts() {
    let staff = staff_client().await;
    let book = create_book(&staff, "10.00", 1).await;
    let customer = customer_client().await;
    let url = format!("{}/api/books/{}/reviews", base_url(), book["id"]);
    let body = json!({ "rating": 4, "comment": "Good" });

    let first = customer.post(&url).json(&body).send().await.expect("post");
    assert_eq!(first.status(), StatusCode::CREATED);
    let second = customer.post(&url).json(&body).send().await.expect("post");
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_review_requires_customer_profile() {
    let staff = staff_client().await;
    let book = create_book(&staff, "10.00", 1).await;
    let (client, _) = registered_client().await;

    let resp = client
        .post(format!("{}/api/books/{}/reviews", base_url(), book["id"]))
        .json(&json!({ "rating": 5, "comment": "No profile yet" }))
        .send()
        .await
        .expect("Failed to post review");

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_approved_reviews_are_paged() {
    let staff = staff_client().await;
    let book = create_book(&staff, "10.00", 1).await;
    let url = format!("{}/api/books/{}/reviews", base_url(), book["id"]);

    for rating in [3, 4] {
        let customer = customer_client().await;
        let review: Value = customer
            .post(&url)
            .json(&json!({ "rating": rating, "comment": "Worth a read" }))
            .send()
            .await
            .expect("Failed to post review")
            .json()
            .await
            .expect("Invalid JSON");
        let resp = staff
            .post(format!("{}/api/reviews/{}/approve", base_url(), review["id"]))
            .send()
            .await
            .expect("Failed to approve review");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let page: Value = staff
        .get(format!("{url}?page=2&page_size=1"))
        .send()
        .await
        .expect("Failed to list reviews")
        .json()
        .await
        .expect("Invalid JSON");
    assert_eq!(page["count"], 2);
    assert_eq!(page["pages"], 2);
    assert_eq!(page["page"], 2);
    assert_eq!(page["results"].as_array().map(Vec::len), Some(1));
    // Newest first, so the second page holds the first review
    assert_eq!(page["results"][0]["rating"], 3);
}
