//! Customer profile repository.

use sqlx::PgPool;

use heavyshop_core::UserId;

use super::RepositoryError;
use crate::models::{Customer, CustomerProfileInput};

const CUSTOMER_COLUMNS: &str =
    "id, user_id, phone, address, birth_date, timezone, created_at, updated_at";

pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the customer profile owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_user(&self, user_id: UserId) -> Result<Option<Customer>, RepositoryError> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(customer)
    }

    /// Create or replace a user's profile. The input must already be validated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if the user doesn't exist.
    pub async fn upsert(
        &self,
        user_id: UserId,
        profile: &CustomerProfileInput,
    ) -> Result<Customer, RepositoryError> {
        sqlx::query_as::<_, Customer>(&format!(
            "INSERT INTO customers (user_id, phone, address, birth_date, timezone)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (user_id) DO UPDATE SET
                 phone = EXCLUDED.phone,
                 address = EXCLUDED.address,
                 birth_date = EXCLUDED.birth_date,
                 timezone = EXCLUDED.timezone,
                 updated_at = now()
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&profile.phone)
        .bind(&profile.address)
        .bind(profile.birth_date)
        .bind(&profile.timezone)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "profile already exists"))
    }
}
