//! Cart repository.
//!
//! One row per device identifier. Line items are kept as a JSONB array and
//! rewritten wholesale on every change (last write wins).

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use cherlygood_core::{Cart, CartId, CartLineItem, DeviceIdentifier};

use super::RepositoryError;

/// Internal row type for cart queries.
#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: String,
    device_identifier: String,
    items: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CartRow> for Cart {
    type Error = RepositoryError;

    fn try_from(row: CartRow) -> Result<Self, Self::Error> {
        let serde_json::Value::Array(raw_items) = row.items else {
            return Err(RepositoryError::DataCorruption(format!(
                "cart {} items is not an array",
                row.id
            )));
        };

        // Unreadable lines are skipped so one bad entry cannot lock a shopper out
        let items = raw_items
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<CartLineItem>(raw) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!(cart_id = %row.id, error = %e, "Skipping unreadable cart line");
                    None
                }
            })
            .collect();

        Ok(Self {
            id: CartId::new(row.id),
            device_identifier: DeviceIdentifier::new(row.device_identifier),
            items,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for shopper carts.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the cart for a device.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, device_identifier), fields(device = %device_identifier.redacted()))]
    pub async fn get_by_device(
        &self,
        device_identifier: &DeviceIdentifier,
    ) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            r"
            SELECT id, device_identifier, items, created_at, updated_at
            FROM storefront.cart
            WHERE device_identifier = $1
            ",
        )
        .bind(device_identifier)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create or overwrite the cart for its device.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, cart), fields(cart_id = %cart.id, items = cart.items.len()))]
    pub async fn save(&self, cart: &Cart) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO storefront.cart (id, device_identifier, items, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (device_identifier) DO UPDATE
            SET items = EXCLUDED.items,
                updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(&cart.id)
        .bind(&cart.device_identifier)
        .bind(Json(&cart.items))
        .bind(cart.created_at)
        .bind(cart.updated_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
