//! Product and upsell lookup.
//!
//! [`CatalogSource`] is the storage seam: it answers raw queries and is
//! implemented by [`crate::db::PgStore`] and, for tests, `InMemoryStore`.
//! The free functions in this module layer the lookup rules on top:
//!
//! - [`get_products`] never round-trips for an empty ID list and never lets
//!   a record with the wrong visibility through.
//! - [`get_upsell`] re-hydrates constituent options from the live published
//!   catalog and drops constituents that no longer resolve.

use std::collections::{HashMap, HashSet};
use std::future::Future;

use cherlygood_core::{
    CatalogProduct, DiscoveryProductsSettings, ProductId, ProductOptions, Upsell, UpsellId,
    Visibility,
};
use tracing::instrument;

use crate::db::RepositoryError;

/// Read access to catalog documents.
pub trait CatalogSource: Send + Sync {
    /// Products matching `query`, in no particular order.
    fn find_products(
        &self,
        query: &ProductQuery,
    ) -> impl Future<Output = Result<Vec<CatalogProduct>, RepositoryError>> + Send;

    /// An upsell document exactly as stored.
    fn find_upsell(
        &self,
        id: &UpsellId,
    ) -> impl Future<Output = Result<Option<Upsell>, RepositoryError>> + Send;

    /// The `discovery_products` settings document, if one exists.
    fn discovery_settings(
        &self,
    ) -> impl Future<Output = Result<Option<DiscoveryProductsSettings>, RepositoryError>> + Send;
}

/// A typed product lookup.
///
/// ```rust
/// use cherlygood_core::{ProductId, Visibility};
/// use cherlygood_storefront::catalog::ProductQuery;
///
/// let query = ProductQuery::by_ids([ProductId::new("70465"), ProductId::new("")]).published();
/// assert_eq!(query.ids().map(<[ProductId]>::len), Some(1));
/// assert_eq!(query.visibility(), Some(Visibility::Published));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    ids: Option<Vec<ProductId>>,
    visibility: Option<Visibility>,
}

impl ProductQuery {
    /// Every product, in any state.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            ids: None,
            visibility: None,
        }
    }

    /// Products with the given IDs.
    ///
    /// Empty IDs are dropped and duplicates collapsed, keeping first-seen order.
    #[must_use]
    pub fn by_ids(ids: impl IntoIterator<Item = ProductId>) -> Self {
        let mut seen = HashSet::new();
        let ids = ids
            .into_iter()
            .filter(|id| !id.is_empty() && seen.insert(id.clone()))
            .collect();

        Self {
            ids: Some(ids),
            visibility: None,
        }
    }

    /// Restrict to one visibility state.
    #[must_use]
    pub const fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Restrict to shopper-visible products.
    #[must_use]
    pub const fn published(self) -> Self {
        self.with_visibility(Visibility::Published)
    }

    /// The requested IDs, or `None` for "all products".
    #[must_use]
    pub fn ids(&self) -> Option<&[ProductId]> {
        self.ids.as_deref()
    }

    /// The visibility filter, if any.
    #[must_use]
    pub const fn visibility(&self) -> Option<Visibility> {
        self.visibility
    }

    /// True when the query is restricted to an empty ID list.
    #[must_use]
    pub fn selects_nothing(&self) -> bool {
        self.ids.as_ref().is_some_and(Vec::is_empty)
    }

    /// Whether a product satisfies every filter of the query.
    #[must_use]
    pub fn matches(&self, product: &CatalogProduct) -> bool {
        let id_matches = self
            .ids
            .as_ref()
            .is_none_or(|ids| ids.contains(&product.id));
        let visibility_matches = self
            .visibility
            .is_none_or(|visibility| visibility == product.visibility);
        id_matches && visibility_matches
    }
}

/// Look up products.
///
/// A query restricted to an empty ID list returns `[]` without touching the
/// source.
///
/// # Errors
///
/// Propagates any source failure.
pub async fn get_products<S: CatalogSource>(
    source: &S,
    query: &ProductQuery,
) -> Result<Vec<CatalogProduct>, RepositoryError> {
    if query.selects_nothing() {
        return Ok(Vec::new());
    }

    let mut products = source.find_products(query).await?;
    products.retain(|product| query.matches(product));
    Ok(products)
}

/// Look up an upsell with its constituents re-hydrated.
///
/// Each constituent's `options` is replaced with the live published
/// product's options; constituents whose product is no longer published are
/// dropped and the rest are sorted by `index`. Returns `None` when the upsell
/// does not exist or none of its constituents resolve.
///
/// # Errors
///
/// Propagates any source failure.
#[instrument(skip_all, fields(upsell_id = %id))]
pub async fn get_upsell<S: CatalogSource>(
    source: &S,
    id: &UpsellId,
) -> Result<Option<Upsell>, RepositoryError> {
    if id.is_empty() {
        return Ok(None);
    }

    let Some(mut upsell) = source.find_upsell(id).await? else {
        return Ok(None);
    };

    let query = ProductQuery::by_ids(upsell.products.iter().map(|p| p.id.clone())).published();
    let live_options: HashMap<ProductId, ProductOptions> = get_products(source, &query)
        .await?
        .into_iter()
        .map(|product| (product.id, product.options))
        .collect();

    upsell.products.retain_mut(|constituent| {
        live_options.get(&constituent.id).is_some_and(|options| {
            constituent.options = options.clone();
            true
        })
    });

    if upsell.products.is_empty() {
        tracing::debug!("No constituents resolve; treating upsell as missing");
        return Ok(None);
    }

    upsell.products.sort_by_key(|constituent| constituent.index);
    Ok(Some(upsell))
}
