//! Upsell editor route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use cherlygood_core::{Alert, BundlePricing, UpsellProduct};

use crate::error::Result;
use crate::state::AppState;
use crate::upsells::{self, UpsellRequest};

/// Look up a product to add to the draft.
#[instrument(skip(state))]
pub async fn product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UpsellProduct>> {
    let product = upsells::find_constituent(state.store(), &id).await?;
    Ok(Json(product))
}

/// Recompute bundle pricing for the current constituents and discount.
#[instrument(skip(state, request))]
pub async fn pricing(
    State(state): State<AppState>,
    Json(request): Json<UpsellRequest>,
) -> Result<Json<BundlePricing>> {
    let pricing = upsells::price_upsell(state.store(), &request).await?;
    Ok(Json(pricing))
}

/// Create a draft upsell.
#[instrument(skip(state, request))]
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<UpsellRequest>,
) -> Result<(StatusCode, Json<Alert>)> {
    let upsell = upsells::create_upsell(state.store(), &request).await?;
    Ok((
        StatusCode::CREATED,
        Json(Alert::success(format!("Upsell {} created", upsell.id))),
    ))
}
