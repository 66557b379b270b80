//! Access control: anonymous and customer accounts against staff endpoints.
//!
//! Run with: cargo test -p heavyshop-integration-tests -- --ignored

use heavyshop_integration_tests::{base_url, client, registered_client, staff_client, unique};
use reqwest::{StatusCode, redirect::Policy};
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_health() {
    let resp = client()
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .expect("Failed to get health");

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_anonymous_api_requests_get_401() {
    let anonymous = client();
    let base = base_url();

    let resp = anonymous
        .get(format!("{base}/api/statistics"))
        .send()
        .await
        .expect("Failed to get statistics");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert!(body["error"].is_string());

    let resp = anonymous
        .post(format!("{base}/api/genres"))
        .json(&json!({ "name": unique("Genre ") }))
        .send()
        .await
        .expect("Failed to post genre");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_customer_cannot_use_staff_api() {
    let (customer, _) = registered_client().await;
    let base = base_url();

    let resp = customer
        .get(format!("{base}/api/statistics"))
        .send()
        .await
        .expect("Failed to get statistics");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = customer
        .post(format!("{base}/api/authors"))
        .json(&json!({ "name": unique("Author ") }))
        .send()
        .await
        .expect("Failed to post author");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_admin_pages_redirect_anonymous_to_login() {
    let anonymous = reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client");

    for path in ["/admin/statistics", "/admin/reviews", "/admin/vacancies"] {
        let resp = anonymous
            .get(format!("{}{path}", base_url()))
            .send()
            .await
            .expect("Failed to get admin page");
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(resp.headers()["location"], "/auth/login", "{path}");
    }
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_staff_sees_statistics() {
    let staff = staff_client().await;

    let resp = staff
        .get(format!(
            "{}/api/statistics?start_date=2026-01-01&end_date=2026-12-31",
            base_url()
        ))
        .send()
        .await
        .expect("Failed to get statistics");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["start_date"], "2026-01-01");
    assert!(body["sales_statistics"]["total_orders"].is_number());
    assert_eq!(body["monthly_sales"]["data"].as_object().map(|m| m.len()), Some(12));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_reversed_date_range_is_rejected() {
    let staff = staff_client().await;

    let resp = staff
        .get(format!(
            "{}/api/statistics?start_date=2026-12-31&end_date=2026-01-01",
            base_url()
        ))
        .send()
        .await
        .expect("Failed to get statistics");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_statistics_without_dates_cover_all_time() {
    let staff = staff_client().await;

    let resp = staff
        .get(format!("{}/api/statistics?start_date=not-a-date", base_url()))
        .send()
        .await
        .expect("Failed to get statistics");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Invalid JSON");
    assert!(body["start_date"].is_null());
    assert!(body["end_date"].is_null());
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_session_median_follows_requested_range() {
    // A login followed by a logout closes one session today
    let (reader, _) = registered_client().await;
    let resp = reader
        .post(format!("{}/auth/logout", base_url()))
        .send()
        .await
        .expect("Failed to log out");
    assert!(resp.status().is_success());

    let staff = staff_client().await;
    let median = |query: &'static str| {
        let staff = staff.clone();
        async move {
            let body: Value = staff
                .get(format!("{}/api/statistics?{query}", base_url()))
                .send()
                .await
                .expect("Failed to get statistics")
                .json()
                .await
                .expect("Invalid JSON");
            body["report"]["session_median_minutes"].clone()
        }
    };

    assert!(median("start_date=2000-01-01").await.is_number());
    assert!(
        median("start_date=2000-01-01&end_date=2000-12-31")
            .await
            .is_null()
    );
}
