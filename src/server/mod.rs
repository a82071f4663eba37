//! HTTP surface
//!
//! JSON and multipart endpoints under `/api`, a health probe, and the chat UI
//! served for every other GET.

pub mod handlers;
pub mod ui;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::router::UploadRouter;

/// Room for multipart boundaries and the prompt field on top of the file.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub router: Arc<UploadRouter>,
}

impl AppState {
    pub fn new(router: UploadRouter) -> Self {
        Self {
            router: Arc::new(router),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(
        state
            .router
            .max_upload_bytes()
            .saturating_add(FORM_OVERHEAD_BYTES),
    );

    let api = Router::new()
        .route("/chat", post(handlers::chat))
        .route("/document", post(handlers::document))
        .route("/image", post(handlers::image))
        .route("/audio", post(handlers::audio))
        .route("/upload", post(handlers::upload))
        .layer(upload_limit);

    Router::new()
        .nest("/api", api)
        .route("/health", get(handlers::health))
        .fallback(get(ui::index))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    request_id = %Uuid::new_v4(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state)
}
