//! Cherlygood Admin library.
//!
//! Back-office tooling: the upsell editor and its JSON endpoints. Catalog
//! documents are shared with the storefront through its repositories.
//!
//! Only deploy on private infrastructure; there is no login in front of it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod editor;
pub mod error;
pub mod routes;
pub mod state;
pub mod upsells;
