//! Unified error handling for admin.
//!
//! Editor failures are answered with an [`Alert`] body so the UI can show
//! the message as-is.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use cherlygood_core::Alert;

use crate::editor::DraftError;
use crate::upsells::UpsellActionError;

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// An upsell editor action failed.
    #[error("Upsell error: {0}")]
    Upsell(#[from] UpsellActionError),
}

impl From<DraftError> for AppError {
    fn from(err: DraftError) -> Self {
        Self::Upsell(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let Self::Upsell(err) = self;

        if err.is_server_error() {
            let event_id = sentry::capture_error(&err);
            tracing::error!(
                error = %err,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let status = match &err {
            UpsellActionError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            UpsellActionError::ProductNotFound(_) => StatusCode::NOT_FOUND,
            UpsellActionError::Lookup(_)
            | UpsellActionError::Create(_)
            | UpsellActionError::IdsExhausted => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Display strings are operator-facing and never carry internals
        (status, Json(Alert::error(err.to_string()))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
