//! Process plumbing shared by the storefront and admin binaries.
//!
//! Error tracking, log output, the per-request span and graceful shutdown
//! are set up the same way for every Cherlygood HTTP service.

use std::borrow::Cow;
use std::time::Duration;

use axum::Router;
use axum::http::{Request, Response, StatusCode};
use sentry::integrations::tracing as sentry_tracing;
use sqlx::PgPool;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::middleware::request_id_middleware;

/// Error tracking settings for one service.
#[derive(Debug, Clone)]
pub struct SentrySettings {
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
    /// Attach request bodies, cookies and IPs to events.
    pub send_default_pii: bool,
}

/// Initialize Sentry and return the guard that must be kept alive.
///
/// Returns `None` (tracking disabled) when no DSN is configured. Must run
/// before [`init_tracing`] so the tracing layer finds the client.
#[must_use]
pub fn init_sentry(settings: &SentrySettings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.dsn.as_deref()?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: settings.environment.clone().map(Cow::Owned),
            sample_rate: settings.sample_rate,
            traces_sample_rate: settings.traces_sample_rate,
            attach_stacktrace: true,
            send_default_pii: settings.send_default_pii,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Map tracing levels onto Sentry: warnings and errors become events,
/// info and debug become breadcrumbs.
#[must_use]
pub fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `default_filter`. Output is flattened JSON on Fly.io
/// (`FLY_APP_NAME` set) and human-readable text elsewhere.
pub fn init_tracing(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let is_fly = std::env::var("FLY_APP_NAME").is_ok();
    let json_layer = is_fly.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!is_fly).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

/// Wrap a router in the request ID middleware and the `http_request` span.
///
/// The span carries `method`, `uri`, `request_id`, `status` and `latency_ms`.
pub fn observe<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
}

/// Readiness of the database behind a service.
pub async fn database_readiness(pool: &PgPool) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Liveness check: the process is up. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Wait for Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get};
    use tower::ServiceExt;

    use crate::middleware::request_id::REQUEST_ID_HEADER;

    #[tokio::test]
    async fn test_observed_router_tags_responses() {
        let app = observe(Router::new().route("/health", get(health)));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn test_unreachable_database_is_not_ready() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://cherlygood@127.0.0.1:1/cherlygood")
            .unwrap();

        assert_eq!(
            database_readiness(&pool).await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
