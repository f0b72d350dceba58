//! Upsell repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use cherlygood_core::{Upsell, UpsellId, Visibility};

use super::{RepositoryError, map_unique_violation};

/// Internal row type for upsell queries.
#[derive(Debug, sqlx::FromRow)]
struct UpsellRow {
    id: String,
    visibility: String,
    document: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UpsellRow> for Upsell {
    type Error = RepositoryError;

    fn try_from(row: UpsellRow) -> Result<Self, Self::Error> {
        let mut upsell: Self = serde_json::from_value(row.document).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid upsell document {}: {e}", row.id))
        })?;
        upsell.visibility = row
            .visibility
            .parse::<Visibility>()
            .map_err(RepositoryError::DataCorruption)?;
        upsell.id = UpsellId::new(row.id);
        upsell.created_at = row.created_at;
        upsell.updated_at = row.updated_at;
        Ok(upsell)
    }
}

/// Repository for upsell documents.
pub struct UpsellRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UpsellRepository<'a> {
    /// Create a new upsell repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an upsell document by ID, exactly as stored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored document is invalid.
    #[instrument(skip(self), fields(upsell_id = %id))]
    pub async fn get_by_id(&self, id: &UpsellId) -> Result<Option<Upsell>, RepositoryError> {
        if id.is_empty() {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, UpsellRow>(
            r"
            SELECT id, visibility, document, created_at, updated_at
            FROM storefront.upsell
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Insert a new upsell.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if an upsell with the same ID exists.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, upsell), fields(upsell_id = %upsell.id))]
    pub async fn insert(&self, upsell: &Upsell) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO storefront.upsell (id, visibility, document, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(&upsell.id)
        .bind(upsell.visibility.as_str())
        .bind(Json(upsell))
        .bind(upsell.created_at)
        .bind(upsell.updated_at)
        .execute(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, &format!("upsell {}", upsell.id)))?;

        Ok(())
    }

    /// Insert or replace an upsell. Used by the seed command.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, upsell), fields(upsell_id = %upsell.id))]
    pub async fn upsert(&self, upsell: &Upsell) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO storefront.upsell (id, visibility, document, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET visibility = EXCLUDED.visibility,
                document = EXCLUDED.document,
                updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(&upsell.id)
        .bind(upsell.visibility.as_str())
        .bind(Json(upsell))
        .bind(upsell.created_at)
        .bind(upsell.updated_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Delete every upsell. Used by `seed --clear`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.upsell")
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
