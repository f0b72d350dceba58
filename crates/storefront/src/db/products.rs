//! Product repository.
//!
//! Products are stored as JSONB documents. The `id` and `visibility` columns
//! are authoritative and overwrite whatever the document carries.

use chrono::Utc;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use cherlygood_core::{CatalogProduct, ProductId, Visibility};

use super::RepositoryError;
use crate::catalog::ProductQuery;

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    visibility: String,
    document: serde_json::Value,
}

impl TryFrom<ProductRow> for CatalogProduct {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let mut product: Self = serde_json::from_value(row.document).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid product document {}: {e}", row.id))
        })?;
        product.visibility = row
            .visibility
            .parse::<Visibility>()
            .map_err(RepositoryError::DataCorruption)?;
        product.id = ProductId::new(row.id);
        Ok(product)
    }
}

/// Repository for catalog product documents.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find products matching a query.
    ///
    /// An ID-restricted query with no IDs returns nothing without a round trip.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored document is invalid.
    #[instrument(skip(self), fields(ids = query.ids().map(<[ProductId]>::len)))]
    pub async fn find(&self, query: &ProductQuery) -> Result<Vec<CatalogProduct>, RepositoryError> {
        if query.selects_nothing() {
            return Ok(Vec::new());
        }

        let ids: Option<Vec<String>> = query
            .ids()
            .map(|ids| ids.iter().map(ToString::to_string).collect());

        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, visibility, document
            FROM storefront.product
            WHERE ($1::text[] IS NULL OR id = ANY($1))
              AND ($2::text IS NULL OR visibility = $2)
            ORDER BY id
            ",
        )
        .bind(ids)
        .bind(query.visibility().map(|visibility| visibility.as_str()))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a single product by ID, regardless of visibility.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored document is invalid.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_by_id(&self, id: &ProductId) -> Result<Option<CatalogProduct>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, visibility, document
            FROM storefront.product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Insert or replace a product document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn upsert(&self, product: &CatalogProduct) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO storefront.product (id, visibility, document, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET visibility = EXCLUDED.visibility,
                document = EXCLUDED.document,
                updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(&product.id)
        .bind(product.visibility.as_str())
        .bind(Json(product))
        .bind(Utc::now())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Delete every product. Used by `seed --clear`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.product")
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
