use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::Response;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::timeout::error::Elapsed;
use tower::{BoxError, ServiceBuilder};
use tracing::warn;

use crate::presentation::http::app_error::{ErrorBody, error_response};

#[derive(Debug, Clone, Copy)]
pub(crate) struct RequestLimits {
    pub(crate) body_limit_bytes: usize,
    pub(crate) concurrency: usize,
    pub(crate) timeout: Duration,
}

/// Body size cap, a server-wide in-flight cap and a per-request deadline.
/// Oversized bodies are refused by the body extractors, so they share the
/// JSON error shape.
pub(crate) fn apply_limits(router: Router, limits: RequestLimits) -> Router {
    router
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(GlobalConcurrencyLimitLayer::new(limits.concurrency))
                .timeout(limits.timeout),
        )
        .layer(DefaultBodyLimit::max(limits.body_limit_bytes))
}

async fn handle_middleware_error(err: BoxError) -> Response {
    if err.is::<Elapsed>() {
        warn!("request timed out");
        return error_response(
            StatusCode::REQUEST_TIMEOUT,
            ErrorBody::new("timeout", "request timed out"),
        );
    }

    warn!(error = %err, "request rejected by middleware");
    error_response(
        StatusCode::SERVICE_UNAVAILABLE,
        ErrorBody::new("unavailable", "service temporarily unavailable"),
    )
}
