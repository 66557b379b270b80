//! Random customers, orders and reviews for exercising the statistics pages.
//!
//! Orders go through the normal cart and checkout path, so stock is
//! decremented and promo rules apply. Afterwards each order is moved back
//! up to 30 days so the monthly and daily figures have something to show.
//! Generated accounts share the password `reader2026`.

use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use heavyshop_core::{BookId, CustomerId, OrderId, PickupPointId, Rating, UserId, UserRole};
use heavyshop_storefront::db::{
    CartRepository, CustomerRepository, OrderRepository, RepositoryError, ReviewRepository,
};
use heavyshop_storefront::models::{CheckoutRequest, CustomerProfileInput};
use heavyshop_storefront::services::AuthService;

use super::{CommandError, connect};

const PASSWORD: &str = "reader2026";
const BACKDATE_DAYS: i32 = 30;

const STREETS: &[&str] = &[
    "Nezavisimosti",
    "Pobediteley",
    "Surganova",
    "Kalvariyskaya",
    "Nemiga",
];

const BOOK_COMMENTS: &[&str] = &[
    "Could not put it down.",
    "Slow start, great ending.",
    "A classic for a reason.",
    "Bought it as a gift, they loved it.",
    "Good translation and a nice edition.",
];

const SHOP_COMMENTS: &[(&str, &str)] = &[
    ("Fast delivery", "The order arrived the next day."),
    ("Helpful staff", "They found exactly the edition I wanted."),
    ("Good prices", "Cheaper than the other shops in town."),
];

/// A valid customer profile with random contact details.
pub fn random_profile(rng: &mut impl Rng) -> CustomerProfileInput {
    let birth_date = NaiveDate::from_ymd_opt(
        rng.random_range(1960..=2004),
        rng.random_range(1..=12),
        rng.random_range(1..=28),
    )
    .unwrap_or_default();
    let street = STREETS.choose(rng).copied().unwrap_or("Nezavisimosti");

    CustomerProfileInput {
        phone: format!(
            "+375 (29) {:03}-{:02}-{:02}",
            rng.random_range(100..1000),
            rng.random_range(0..100),
            rng.random_range(0..100)
        ),
        address: format!("Minsk, {street} {}", rng.random_range(1..200)),
        birth_date,
        timezone: "Europe/Minsk".to_owned(),
    }
}

/// Create customers and place `orders` random orders.
pub async fn run(orders: u32, seed: Option<u64>) -> Result<(), CommandError> {
    let mut rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
    let today = Utc::now().date_naive();
    let pool = connect().await?;

    let books: Vec<BookId> =
        sqlx::query_scalar("SELECT id FROM books WHERE quantity > 0 ORDER BY id")
            .fetch_all(&pool)
            .await?;
    if books.is_empty() {
        return Err(CommandError::Fixtures(
            "no books in stock; run `hs-cli seed` first".to_owned(),
        ));
    }
    let pickup_points: Vec<PickupPointId> =
        sqlx::query_scalar("SELECT id FROM pickup_points WHERE is_active ORDER BY id")
            .fetch_all(&pool)
            .await?;

    let auth = AuthService::new(&pool);
    let profiles = CustomerRepository::new(&pool);
    let batch: u32 = rng.random_range(1000..10_000);
    let mut customers: Vec<(UserId, CustomerId, String)> = Vec::new();
    for i in 0..(orders / 3).max(1) {
        let username = format!("reader{batch}_{i}");
        let user = auth
            .register(
                &username,
                &format!("{username}@example.com"),
                PASSWORD,
                UserRole::Customer,
            )
            .await?;
        let profile = random_profile(&mut rng)
            .validate(today)
            .map_err(CommandError::Fixtures)?;
        let customer = profiles.upsert(user.id, &profile).await?;
        customers.push((user.id, customer.id, customer.address));
    }
    tracing::info!(customers = customers.len(), "Customers created");

    let carts = CartRepository::new(&pool);
    let order_repo = OrderRepository::new(&pool);
    let reviews = ReviewRepository::new(&pool);
    let mut placed = 0_u32;
    let mut reviewed = 0_u32;

    for _ in 0..orders {
        let Some((user_id, customer_id, address)) = customers.choose(&mut rng).cloned() else {
            break;
        };

        let count = rng.random_range(1..=3);
        let picks: Vec<BookId> = books.choose_multiple(&mut rng, count).copied().collect();
        for book_id in picks {
            let quantity = rng.random_range(1..=2);
            if let Err(e) = carts.add(user_id, book_id, quantity).await {
                tracing::debug!(book_id = %book_id, error = %e, "Book skipped");
            }
        }

        let pickup_point_id = if rng.random_bool(0.3) {
            pickup_points.choose(&mut rng).copied()
        } else {
            None
        };
        // Pickup orders take the point's address
        let request = CheckoutRequest {
            shipping_address: if pickup_point_id.is_some() {
                String::new()
            } else {
                address
            },
            delivery_date: None,
            pickup_point_id,
            promo_code: None,
        }
        .validate(today)
        .map_err(CommandError::Fixtures)?;

        let detail = match order_repo.place(user_id, customer_id, &request, today).await {
            Ok(detail) => detail,
            Err(RepositoryError::Validation(msg)) => {
                tracing::debug!(%msg, "Order skipped");
                carts.clear(user_id).await?;
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        backdate(&pool, detail.order.id, rng.random_range(0..BACKDATE_DAYS)).await?;
        placed += 1;

        if rng.random_bool(0.4)
            && let Some(item) = detail.items.first()
            && let Ok(rating) = Rating::new(rng.random_range(2..=Rating::MAX))
        {
            let comment = BOOK_COMMENTS.choose(&mut rng).copied().unwrap_or_default();
            match reviews.create(item.book_id, customer_id, rating, comment).await {
                Ok(review) => {
                    if rng.random_bool(0.7) {
                        reviews.approve(review.id).await?;
                    }
                    reviewed += 1;
                }
                Err(RepositoryError::Conflict(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }

        if rng.random_bool(0.1)
            && let Some(&(title, text)) = SHOP_COMMENTS.choose(&mut rng)
            && let Ok(rating) = Rating::new(rng.random_range(4..=Rating::MAX))
        {
            reviews
                .create_customer_review(customer_id, rating, title, text)
                .await?;
        }
    }

    tracing::info!(orders = placed, reviews = reviewed, "Test data generated");
    Ok(())
}

async fn backdate(pool: &sqlx::PgPool, order_id: OrderId, days: i32) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE orders SET created_at = created_at - make_interval(days => $2) WHERE id = $1",
    )
    .bind(order_id)
    .bind(days)
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_random_profiles_pass_validation() {
        let mut rng = StdRng::seed_from_u64(7);
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        for _ in 0..50 {
            let profile = random_profile(&mut rng);
            assert!(profile.clone().validate(today).is_ok(), "{profile:?}");
        }
    }

    #[test]
    fn test_same_seed_same_profile() {
        let a = random_profile(&mut StdRng::seed_from_u64(42));
        let b = random_profile(&mut StdRng::seed_from_u64(42));
        assert_eq!(a.phone, b.phone);
        assert_eq!(a.birth_date, b.birth_date);
    }
}
