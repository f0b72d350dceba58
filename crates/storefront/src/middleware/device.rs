//! Anonymous shopper identification.
//!
//! Carts are keyed by a random identifier kept in the `device_identifier`
//! cookie. It is issued on the first add-to-cart and never tied to an
//! account.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use tower_sessions::cookie::time::Duration;
use tower_sessions::cookie::{Cookie, SameSite};
use uuid::Uuid;

use cherlygood_core::DeviceIdentifier;

/// Device identifier cookie name.
pub const DEVICE_COOKIE_NAME: &str = "device_identifier";

/// Device identifier lifetime (one year).
const DEVICE_COOKIE_MAX_AGE_DAYS: i64 = 365;

/// Extractor for the shopper's device identifier.
///
/// Never rejects: a missing or unreadable cookie yields an empty identifier,
/// which downstream code treats as "no cart".
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Device(device): Device) -> impl IntoResponse {
///     format!("device: {device}")
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Device(pub DeviceIdentifier);

impl<S> FromRequestParts<S> for Device
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(device_identifier_from_headers(&parts.headers)))
    }
}

/// Read the device identifier from `Cookie` headers.
#[must_use]
pub fn device_identifier_from_headers(headers: &HeaderMap) -> DeviceIdentifier {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == DEVICE_COOKIE_NAME)
        .map(|cookie| DeviceIdentifier::new(cookie.value().trim()))
        .unwrap_or_default()
}

/// Generate a fresh device identifier.
#[must_use]
pub fn new_device_identifier() -> DeviceIdentifier {
    DeviceIdentifier::new(Uuid::new_v4().to_string())
}

/// Build the `Set-Cookie` value carrying a device identifier.
#[must_use]
pub fn device_cookie(device_identifier: &DeviceIdentifier, secure: bool) -> Cookie<'static> {
    Cookie::build((DEVICE_COOKIE_NAME, device_identifier.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::days(DEVICE_COOKIE_MAX_AGE_DAYS))
        .build()
}
