//! Newtype IDs for type-safe document references.
//!
//! Every document in the store is keyed by an opaque string (product and
//! upsell IDs are 5-digit numbers in practice, carts use generated keys).
//! Use the `define_id!` macro to create wrappers that prevent accidentally
//! passing an upsell ID where a product ID is expected.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `is_empty()`
/// - `From<String>`, `From<&str>` and `Into<String>` implementations
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
///
/// # Example
///
/// ```rust
/// # use cherlygood_core::define_id;
/// define_id!(ShelfId);
/// define_id!(BinId);
///
/// let shelf = ShelfId::new("10231");
/// let bin = BinId::new("10231");
/// assert_eq!(shelf.as_str(), bin.as_str());
///
/// // These are different types, so this won't compile:
/// // let _: ShelfId = bin;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Default,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the ID is the empty string.
            ///
            /// Empty IDs show up in stale or hand-edited documents and never
            /// resolve to anything.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <String as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <String as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <String as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <String as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

// Document IDs
define_id!(ProductId);
define_id!(UpsellId);
define_id!(VariantId);
define_id!(CartId);

// Anonymous shopper key, read from the `device_identifier` cookie
define_id!(DeviceIdentifier);

/// Characters of a device identifier kept in logs.
const DEVICE_LOG_PREFIX_LEN: usize = 8;

impl DeviceIdentifier {
    /// A short prefix for logs and error reports.
    ///
    /// The full value is the only key to a shopper's cart and never leaves
    /// the request.
    #[must_use]
    pub fn redacted(&self) -> String {
        let mut prefix: String = self.0.chars().take(DEVICE_LOG_PREFIX_LEN).collect();
        if self.0.chars().count() > DEVICE_LOG_PREFIX_LEN {
            prefix.push('…');
        }
        prefix
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_serializes_transparently() {
        let id = ProductId::new("70465");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"70465\"");

        let parsed: ProductId = serde_json::from_str("\"12345\"").unwrap();
        assert_eq!(parsed.as_str(), "12345");
    }

    #[test]
    fn test_empty_id() {
        assert!(DeviceIdentifier::default().is_empty());
        assert!(!DeviceIdentifier::from("abc").is_empty());
    }

    #[test]
    fn test_redacted_device_identifier_keeps_a_prefix() {
        let device = DeviceIdentifier::new("3f2a9c1e-7b44-4d0a-9e51-0c8d2b6f1a77");
        assert_eq!(device.redacted(), "3f2a9c1e…");
        assert_eq!(DeviceIdentifier::new("abc").redacted(), "abc");
        assert_eq!(DeviceIdentifier::default().redacted(), "");
    }

    #[test]
    fn test_display_matches_inner_value() {
        let id = UpsellId::from(String::from("55012"));
        assert_eq!(id.to_string(), "55012");
        assert_eq!(String::from(id), "55012");
    }
}
