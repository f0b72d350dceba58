//! Status enums shared by the storefront and admin.

use serde::{Deserialize, Serialize};

/// Publication state of a catalog document (product or upsell).
///
/// Shoppers only ever see `Published` documents; admin tooling can read
/// every state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    #[default]
    Draft,
    Published,
    Hidden,
}

impl Visibility {
    /// The stored string form (`DRAFT`, `PUBLISHED`, `HIDDEN`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Published => "PUBLISHED",
            Self::Hidden => "HIDDEN",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(Self::Draft),
            "PUBLISHED" => Ok(Self::Published),
            "HIDDEN" => Ok(Self::Hidden),
            _ => Err(format!("invalid visibility: {s}")),
        }
    }
}

/// Classification of a user-facing alert message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    #[default]
    Neutral,
    Error,
    Success,
}

/// A message shown to an operator after an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub message: String,
}

impl Alert {
    /// Create an error alert.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            alert_type: AlertType::Error,
            message: message.into(),
        }
    }

    /// Create a success alert.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            alert_type: AlertType::Success,
            message: message.into(),
        }
    }

    /// Create a neutral (informational) alert.
    #[must_use]
    pub fn neutral(message: impl Into<String>) -> Self {
        Self {
            alert_type: AlertType::Neutral,
            message: message.into(),
        }
    }
}
