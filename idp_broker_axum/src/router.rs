//! Combined router for all authentication and admin endpoints

use axum::Router;
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Create a combined router for all broker endpoints
///
/// The endpoints will be available at:
/// - {IDB_ROUTE_PREFIX}/auth/...
/// - {IDB_ROUTE_PREFIX}/admin/...
///
/// Mount it once under [`idp_broker::IDB_ROUTE_PREFIX`].
pub fn idp_broker_router() -> Router {
    Router::new()
        .nest("/auth", super::auth::router())
        .nest("/admin", super::admin::router())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
}

/// Same as [`idp_broker_router`] but without the HTTP tracing layer, for
/// applications that bring their own.
pub fn idp_broker_router_no_trace() -> Router {
    Router::new()
        .nest("/auth", super::auth::router())
        .nest("/admin", super::admin::router())
}
