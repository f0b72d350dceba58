//! Settings database operations.
//!
//! Settings are small named JSONB documents edited from the admin side and
//! read by the storefront.

use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::PgPool;
use sqlx::types::Json;

use super::RepositoryError;

/// Key of the discovery widget settings document.
pub const DISCOVERY_PRODUCTS_KEY: &str = "discovery_products";

/// Repository for settings documents.
pub struct SettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a setting value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored value has the wrong shape.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, RepositoryError> {
        let value: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT value FROM storefront.setting WHERE key = $1")
                .bind(key)
                .fetch_optional(self.pool)
                .await?;

        value
            .map(|value| {
                serde_json::from_value(value).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid setting {key}: {e}"))
                })
            })
            .transpose()
    }

    /// Set a setting value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO storefront.setting (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            ",
        )
        .bind(key)
        .bind(Json(value))
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Delete every setting. Used by `seed --clear`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.setting")
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
