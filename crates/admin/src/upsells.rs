//! Upsell editor actions.
//!
//! Looks up constituent products, prices drafts and persists new upsells.
//! Every validation runs before the first write.

use std::collections::BTreeMap;
use std::future::Future;

use chrono::Utc;
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use cherlygood_core::{
    BundlePricing, CatalogProduct, ProductId, Upsell, UpsellId, UpsellProduct,
};
#[cfg(any(test, feature = "test-support"))]
use cherlygood_storefront::db::InMemoryStore;
use cherlygood_storefront::db::{PgStore, ProductRepository, RepositoryError, UpsellRepository};

use crate::editor::{DraftError, UpsellDraft, constituent, validate_product_id};

/// How many random IDs to try before giving up on a create.
pub const MAX_ID_ATTEMPTS: usize = 5;

/// Errors from editor actions.
///
/// The display strings double as operator-facing alert messages.
#[derive(Debug, Error)]
pub enum UpsellActionError {
    #[error(transparent)]
    Invalid(#[from] DraftError),

    #[error("Product not found")]
    ProductNotFound(ProductId),

    #[error("Failed to add product")]
    Lookup(#[source] RepositoryError),

    #[error("Failed to create upsell")]
    Create(#[source] RepositoryError),

    #[error("Failed to create upsell")]
    IdsExhausted,
}

impl UpsellActionError {
    /// Whether the failure is the server's fault rather than the operator's.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Lookup(_) | Self::Create(_) | Self::IdsExhausted)
    }
}

/// Storage used by the editor.
pub trait UpsellStore: Send + Sync {
    /// A product by ID, regardless of visibility.
    fn find_product(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<Option<CatalogProduct>, RepositoryError>> + Send;

    /// Insert a new upsell; `RepositoryError::Conflict` if the ID is taken.
    fn create_upsell(
        &self,
        upsell: &Upsell,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

impl UpsellStore for PgStore {
    async fn find_product(&self, id: &ProductId) -> Result<Option<CatalogProduct>, RepositoryError> {
        ProductRepository::new(self.pool()).get_by_id(id).await
    }

    async fn create_upsell(&self, upsell: &Upsell) -> Result<(), RepositoryError> {
        UpsellRepository::new(self.pool()).insert(upsell).await
    }
}

#[cfg(any(test, feature = "test-support"))]
impl UpsellStore for InMemoryStore {
    async fn find_product(&self, id: &ProductId) -> Result<Option<CatalogProduct>, RepositoryError> {
        Ok(self.product(id))
    }

    async fn create_upsell(&self, upsell: &Upsell) -> Result<(), RepositoryError> {
        InMemoryStore::create_upsell(self, upsell.clone())
    }
}

/// A random five-digit upsell ID.
pub fn random_upsell_id<R: Rng + ?Sized>(rng: &mut R) -> UpsellId {
    UpsellId::new(rng.random_range(10_000..=99_999_u32).to_string())
}

/// Body of the pricing and create requests.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpsellRequest {
    pub main_image: String,
    pub product_ids: Vec<String>,
    pub discount_percentage: String,
    /// Display names overriding the catalog name, keyed by product ID.
    pub product_names: BTreeMap<String, String>,
}

/// Look up a product typed into the editor.
///
/// # Errors
///
/// Returns `Invalid` for a malformed ID, `ProductNotFound` for an unknown one
/// and `Lookup` if the store fails.
#[instrument(skip(store))]
pub async fn find_constituent<S: UpsellStore>(
    store: &S,
    input: &str,
) -> Result<UpsellProduct, UpsellActionError> {
    let id = validate_product_id(input)?;
    fetch(store, id).await
}

async fn fetch<S: UpsellStore>(store: &S, id: ProductId) -> Result<UpsellProduct, UpsellActionError> {
    match store.find_product(&id).await {
        Ok(Some(product)) => Ok(constituent(product)),
        Ok(None) => Err(UpsellActionError::ProductNotFound(id)),
        Err(e) => {
            tracing::error!(product_id = %id, error = %e, "Product lookup failed");
            Err(UpsellActionError::Lookup(e))
        }
    }
}

/// Add a product to a draft: validate, reject duplicates, then look it up.
///
/// # Errors
///
/// See [`find_constituent`]; also `Invalid(DuplicateProduct)`.
pub async fn add_product<S: UpsellStore>(
    store: &S,
    draft: &mut UpsellDraft,
    input: &str,
) -> Result<(), UpsellActionError> {
    let id = validate_product_id(input)?;
    if draft.contains(&id) {
        return Err(DraftError::DuplicateProduct.into());
    }
    let product = fetch(store, id).await?;
    draft.add_product(product)?;
    Ok(())
}

/// Build a draft from a request.
///
/// Name overrides are applied after every product is added; a blank name
/// keeps the catalog name.
///
/// # Errors
///
/// Returns the first invalid discount or product, then
/// `Invalid(RenamedProductMissing)` for an override of a product that is not
/// in the bundle.
pub async fn build_draft<S: UpsellStore>(
    store: &S,
    request: &UpsellRequest,
) -> Result<UpsellDraft, UpsellActionError> {
    let mut draft = UpsellDraft::new();
    draft.set_main_image(request.main_image.as_str());
    draft.set_discount(&request.discount_percentage)?;
    for input in &request.product_ids {
        add_product(store, &mut draft, input).await?;
    }

    for (input, name) in &request.product_names {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let id = validate_product_id(input)?;
        if !draft.rename_product(&id, name) {
            return Err(DraftError::RenamedProductMissing.into());
        }
    }
    Ok(draft)
}

/// Price a prospective bundle.
///
/// # Errors
///
/// See [`build_draft`].
pub async fn price_upsell<S: UpsellStore>(
    store: &S,
    request: &UpsellRequest,
) -> Result<BundlePricing, UpsellActionError> {
    Ok(build_draft(store, request).await?.pricing()?)
}

/// Validate and persist a new draft upsell under a fresh random ID.
///
/// # Errors
///
/// Returns `Invalid`/`ProductNotFound` before anything is written, `Create`
/// if the insert fails and `IdsExhausted` if every generated ID collided.
#[instrument(skip(store, request), fields(products = request.product_ids.len()))]
pub async fn create_upsell<S: UpsellStore>(
    store: &S,
    request: &UpsellRequest,
) -> Result<Upsell, UpsellActionError> {
    let new_upsell = build_draft(store, request).await?.finalize()?;
    let now = Utc::now();

    for attempt in 1..=MAX_ID_ATTEMPTS {
        let id = random_upsell_id(&mut rand::rng());
        let upsell = new_upsell.clone().into_upsell(id, now);

        match store.create_upsell(&upsell).await {
            Ok(()) => {
                tracing::info!(upsell_id = %upsell.id, "Upsell created");
                return Ok(upsell);
            }
            Err(RepositoryError::Conflict(_)) => {
                tracing::debug!(attempt, upsell_id = %upsell.id, "Upsell ID taken, retrying");
            }
            Err(e) => return Err(UpsellActionError::Create(e)),
        }
    }

    Err(UpsellActionError::IdsExhausted)
}
