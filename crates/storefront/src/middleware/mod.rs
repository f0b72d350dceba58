//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with method, uri, status, latency)
//! 3. Request ID (add unique ID to each request)
//!
//! The [`Device`] extractor reads the anonymous cart key per handler rather
//! than as a layer.

pub mod device;
pub mod request_id;

pub use device::{Device, device_cookie, new_device_identifier};
pub use request_id::{RequestId, request_id_middleware};
