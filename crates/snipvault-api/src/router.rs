//! Route table and middleware stack.

use axum::http::Method;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::handlers::{ai, collections, snippets};
use crate::state::AppState;

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Snippets
        .route(
            "/api/snippets",
            get(snippets::list_snippets).post(snippets::create_snippet),
        )
        .route("/api/snippets/search", post(snippets::search_snippets))
        .route("/api/snippets/raw/:id", get(snippets::get_raw_code))
        .route(
            "/api/snippets/statistics/count",
            get(snippets::list_tags),
        )
        .route(
            "/api/snippets/:id",
            get(snippets::get_snippet)
                .put(snippets::update_snippet)
                .delete(snippets::delete_snippet),
        )
        .route("/api/snippets/:id/move", post(snippets::move_snippet))
        // Tags
        .route("/api/tags", get(snippets::list_tags))
        // Collections
        .route(
            "/api/collections",
            get(collections::list_collections).post(collections::create_collection),
        )
        .route(
            "/api/collections/:id",
            get(collections::get_collection)
                .put(collections::update_collection)
                .delete(collections::delete_collection),
        )
        .route(
            "/api/collections/:id/snippets",
            post(collections::assign_snippets),
        )
        // AI
        .route("/api/ai/explain", post(ai::explain))
        .route("/api/ai/generate-tags", post(ai::generate_tags))
        .route("/api/ai/analyze", post(ai::analyze))
        .route("/api/ai/generate-snippet", post(ai::generate_snippet))
        .route("/api/ai/optimize", post(ai::optimize))
        .route("/api/ai/optimize-code", post(ai::optimize_code))
        .route("/api/ai/security-scan", post(ai::security_scan))
        .route("/api/ai/convert-code", post(ai::convert_code))
        .route("/api/ai/compare-languages", post(ai::compare_languages))
        .route("/api/ai/refresh", post(ai::refresh_snippet_analysis))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                ])
                .allow_headers(Any)
                .allow_origin(Any),
        )
        .with_state(state)
}
