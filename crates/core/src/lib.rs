//! Cherlygood Core - Shared types library.
//!
//! This crate provides common types used across all Cherlygood components:
//! - `storefront` - Public-facing shop (cart page, cart API)
//! - `admin` - Back-office tools (upsell editor)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, catalog/cart documents, statuses and money helpers
//! - [`pricing`] - Upsell bundle pricing (".99" rounding, discount handling)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pricing;
pub mod types;

pub use pricing::{BundlePricing, DiscountError, DiscountPercent, PricingError, compute_pricing};
pub use types::*;
