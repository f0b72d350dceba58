//! Seed the catalog from a YAML file.
//!
//! Products are stored as given. Upsells list their constituents by product
//! ID and are priced with the same rules as the admin editor, so seeded
//! bundles always carry consistent ".99" pricing.
//!
//! ```yaml
//! products:
//!   - id: "11111"
//!     name: Pleated Skirt
//!     slug: pleated-skirt
//!     pricing: { basePrice: "12.50" }
//!     images: { main: /img/skirt.jpg }
//!     visibility: PUBLISHED
//! upsells:
//!   - id: "55012"
//!     mainImage: /img/bundle.jpg
//!     productIds: ["11111", "22222"]
//!     discountPercentage: "20"
//! settings:
//!   discoveryProducts:
//!     visibleOnPages: { home: true, cart: true }
//! ```

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use cherlygood_admin::editor::{DraftError, UpsellDraft, constituent, validate_product_id};
use cherlygood_core::{
    CatalogProduct, DiscoveryProductsSettings, ProductId, Upsell, UpsellId, Visibility,
};
use cherlygood_storefront::db::{
    self, DISCOVERY_PRODUCTS_KEY, ProductRepository, SettingsRepository, UpsellRepository,
};

/// Contents of a seed file.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeedCatalog {
    pub products: Vec<CatalogProduct>,
    pub upsells: Vec<SeedUpsell>,
    pub settings: SeedSettings,
}

/// An upsell as written in a seed file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedUpsell {
    pub id: UpsellId,
    pub main_image: String,
    #[serde(default = "published")]
    pub visibility: Visibility,
    pub product_ids: Vec<ProductId>,
    #[serde(default)]
    pub discount_percentage: String,
}

const fn published() -> Visibility {
    Visibility::Published
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeedSettings {
    pub discovery_products: Option<DiscoveryProductsSettings>,
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("upsell {upsell}: unknown product {product}")]
    UnknownProduct { upsell: UpsellId, product: ProductId },

    #[error("upsell {upsell}: {source}")]
    InvalidUpsell { upsell: UpsellId, source: DraftError },
}

/// Check a seed file for problems before touching the database.
#[must_use]
pub fn validate_catalog(catalog: &SeedCatalog) -> Vec<String> {
    let mut errors = Vec::new();

    let mut product_ids = HashSet::new();
    for product in &catalog.products {
        if let Err(e) = validate_product_id(product.id.as_str()) {
            errors.push(format!("product {:?}: {e}", product.id.as_str()));
        }
        if !product_ids.insert(&product.id) {
            errors.push(format!("product {}: duplicate id", product.id));
        }
    }

    let mut upsell_ids = HashSet::new();
    for upsell in &catalog.upsells {
        if !upsell_ids.insert(&upsell.id) {
            errors.push(format!("upsell {}: duplicate id", upsell.id));
        }
        for product_id in &upsell.product_ids {
            if !product_ids.contains(product_id) {
                errors.push(format!("upsell {}: unknown product {product_id}", upsell.id));
            }
        }
    }

    errors
}

/// Build priced upsell documents from their seed entries.
///
/// # Errors
///
/// Returns the first upsell that references a missing product or fails
/// editor validation.
pub fn build_upsells(catalog: &SeedCatalog, now: DateTime<Utc>) -> Result<Vec<Upsell>, SeedError> {
    catalog
        .upsells
        .iter()
        .map(|seed| build_upsell(seed, &catalog.products, now))
        .collect()
}

fn build_upsell(
    seed: &SeedUpsell,
    products: &[CatalogProduct],
    now: DateTime<Utc>,
) -> Result<Upsell, SeedError> {
    let invalid = |source| SeedError::InvalidUpsell {
        upsell: seed.id.clone(),
        source,
    };

    let mut draft = UpsellDraft::new();
    draft.set_main_image(seed.main_image.as_str());
    draft.set_discount(&seed.discount_percentage).map_err(invalid)?;

    for product_id in &seed.product_ids {
        let product = products
            .iter()
            .find(|product| &product.id == product_id)
            .ok_or_else(|| SeedError::UnknownProduct {
                upsell: seed.id.clone(),
                product: product_id.clone(),
            })?;
        draft.add_product(constituent(product.clone())).map_err(invalid)?;
    }

    let mut upsell = draft.finalize().map_err(invalid)?.into_upsell(seed.id.clone(), now);
    upsell.visibility = seed.visibility;
    Ok(upsell)
}

/// Seed products, upsells and settings from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML catalog
/// * `clear_existing` - If true, delete the existing catalog first
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation, or if a
/// database operation fails.
pub async fn catalog(file_path: &str, clear_existing: bool) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let catalog: SeedCatalog = serde_yaml::from_str(&content)?;

    info!(
        products = catalog.products.len(),
        upsells = catalog.upsells.len(),
        "Parsed catalog"
    );

    let errors = validate_catalog(&catalog);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let upsells = build_upsells(&catalog, Utc::now())?;

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let products_repo = ProductRepository::new(&pool);
    let upsells_repo = UpsellRepository::new(&pool);
    let settings_repo = SettingsRepository::new(&pool);

    if clear_existing {
        let removed = upsells_repo.delete_all().await?
            + products_repo.delete_all().await?
            + settings_repo.delete_all().await?;
        info!(removed, "Cleared existing catalog");
    }

    for product in &catalog.products {
        products_repo.upsert(product).await?;
    }
    for upsell in &upsells {
        upsells_repo.upsert(upsell).await?;
    }
    if let Some(discovery) = &catalog.settings.discovery_products {
        settings_repo.set(DISCOVERY_PRODUCTS_KEY, discovery).await?;
    }

    info!("Seeding complete!");
    info!("  Products: {}", catalog.products.len());
    info!("  Upsells: {}", upsells.len());

    Ok(())
}
