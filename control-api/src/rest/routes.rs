use axum::{
    Router,
    body::Body,
    http::{
        HeaderValue, Request, Response,
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
    },
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{Span, info};

use super::handlers::{self, AppState};

pub fn create_router(state: Arc<AppState>) -> Router {
    // Method mismatches on known paths fall through to the same 404/OPTIONS
    // handler as unknown paths. HEAD is routed explicitly since axum would
    // otherwise serve it from the GET handler.
    Router::new()
        .route(
            "/status",
            get(handlers::get_status)
                .head(handlers::fallback)
                .fallback(handlers::fallback),
        )
        .route(
            "/restart-claude",
            post(handlers::restart_claude).fallback(handlers::fallback),
        )
        .route(
            "/rebuild-claude",
            post(handlers::rebuild_claude).fallback(handlers::fallback),
        )
        .fallback(handlers::fallback)
        .layer(
            TraceLayer::new_for_http()
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!(method = %request.method(), path = %request.uri().path(), "Request");
                })
                .on_response(|response: &Response<Body>, latency: Duration, _span: &Span| {
                    info!(status = %response.status(), latency_ms = latency.as_millis() as u64, "Response");
                }),
        )
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .with_state(state)
}
