use axum::{
    Json, Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use sweetshop_api::auth::{self, AppState};
use sweetshop_api::middleware::{require_admin, require_auth};
use sweetshop_api::sweets;

/// Assemble the full application router. Kept separate from `main` so
/// the integration tests can mount the exact same app.
pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    let public_routes = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .with_state(state.clone());

    // Mutating inventory routes carry the admin guard on top of auth.
    let admin_routes = Router::new()
        .route("/api/sweets", post(sweets::create_sweet))
        .route(
            "/api/sweets/{id}",
            put(sweets::update_sweet).delete(sweets::delete_sweet),
        )
        .route("/api/sweets/{id}/restock", post(sweets::restock_sweet))
        .layer(middleware::from_fn(require_admin));

    let user_routes = Router::new()
        .route("/api/sweets", get(sweets::list_sweets))
        .route("/api/sweets/search", get(sweets::search_sweets))
        .route("/api/sweets/{id}/purchase", post(sweets::purchase_sweet));

    let protected_routes = user_routes
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .route("/health", get(health))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// GET /health — liveness check (no auth).
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "OK", "message": "Server is running" }))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    // No allowlist configured: stay permissive for local development.
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}
