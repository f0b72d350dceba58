//! Cherlygood Storefront library.
//!
//! Cart composition, upsell bundles and cart-page recommendations, exposed
//! as a library so the admin and CLI binaries can share the repositories and
//! the integration tests can drive the flows against an in-memory store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod db;
pub mod discovery;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

#[cfg(test)]
mod test_support;
