//! # API REST
//!
//! HTTP front end for an LDP store.
//!
//! Handles:
//! - routing every request to the store's method dispatch
//! - mapping store failures to status codes
//! - REST-specific concerns (CORS, body limits)
//!
//! [`ServerSettings`] reads the process environment for both server binaries.

#![warn(rust_2018_idioms)]

mod settings;

pub use settings::{ServerSettings, StorageKind};

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};
use ldp_core::{StoreDecorator, StoreError};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Largest request body buffered before dispatch.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Clone)]
struct AppState {
    store: Arc<StoreDecorator>,
}

/// Router that hands every path and method to `store`.
pub fn router(store: Arc<StoreDecorator>) -> Router {
    Router::new()
        .fallback(serve_resource)
        .layer(CorsLayer::permissive())
        .with_state(AppState { store })
}

async fn serve_resource(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(e) => {
            tracing::error!("Read body error: {:?}", e);
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };
    let request = http::Request::from_parts(parts, body);

    match state.store.handle_request(&request).await {
        Ok(response) => response.map(Body::from),
        Err(e) => error_response(&request, &e),
    }
}

fn error_response(request: &http::Request<bytes::Bytes>, error: &StoreError) -> Response {
    let (status, message) = match error {
        e if e.is_invalid_identifier() => (StatusCode::BAD_REQUEST, "Invalid resource identifier"),
        StoreError::UnsupportedMethod(_) => (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"),
        StoreError::MethodNotImplemented(_) => (StatusCode::NOT_IMPLEMENTED, "Not implemented"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
    };

    if status.is_server_error() {
        tracing::error!("{} {} error: {:?}", request.method(), request.uri(), error);
    } else {
        tracing::debug!("{} {} rejected: {}", request.method(), request.uri(), error);
    }
    (status, message).into_response()
}
