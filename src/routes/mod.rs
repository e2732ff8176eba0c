use std::time::Duration;

use axum::{
    Router,
    http::{HeaderName, Request, Response, Uri},
    routing::get,
};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::{
    error::{AppError, handle_panic},
    middleware::policy::AccessPolicy,
    state::AppState,
};

pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod payments;
pub mod reviews;
pub mod tools;
pub mod users;

// Each module registers its routes under an explicit access policy.
pub fn create_api_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", AccessPolicy::Public.protect(get(health::home), state))
        .merge(users::router(state))
        .merge(tools::router(state))
        .merge(orders::router(state))
        .merge(reviews::router(state))
        .merge(payments::router(state))
}

/// Requests served at once across all routes.
pub const MAX_IN_FLIGHT_REQUESTS: usize = 100;

/// Full application: routes, docs, JSON fallbacks and the HTTP middleware stack.
pub fn create_router(state: AppState) -> Router {
    create_router_with_limit(state, MAX_IN_FLIGHT_REQUESTS)
}

pub fn create_router_with_limit(state: AppState, max_in_flight: usize) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id
            )
        })
        .on_request(|request: &Request<_>, _span: &tracing::Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "request started"
            );
        })
        .on_response(|response: &Response<_>, latency: Duration, _span: &tracing::Span| {
            tracing::info!(
                status = %response.status(),
                ms = %latency.as_millis(),
                "request finished"
            );
        });

    Router::new()
        .merge(create_api_router(&state))
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(trace_layer)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        // One semaphore shared by every route; `Router::layer` wraps each route separately.
        .layer(GlobalConcurrencyLimitLayer::new(max_in_flight))
        .with_state(state)
}

async fn not_found(uri: Uri) -> AppError {
    tracing::debug!(path = %uri.path(), "no route");
    AppError::NotFound
}
