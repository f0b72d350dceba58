//! Core types for Cherlygood.
//!
//! This module provides type-safe wrappers and document shapes shared by the
//! storefront, admin and CLI.

pub mod cart;
pub mod catalog;
pub mod id;
pub mod price;
pub mod status;

pub use cart::*;
pub use catalog::*;
pub use id::*;
pub use price::{Pricing, format_usd, round_down_to_99};
pub use status::*;
