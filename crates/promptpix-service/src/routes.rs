//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderName;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use promptpix_core::ImageOperation;

use crate::credit_guard::{credit_guard, CreditGuard, CREDITS_REMAINING_HEADER};
use crate::handlers::{accounts, credits, health, images};
use crate::state::AppState;

// ============================================================================
// Concurrency Limiting Constants
// ============================================================================

/// Maximum concurrent requests for image endpoints.
/// Each one holds an outbound call to the image API.
const IMAGE_MAX_CONCURRENT_REQUESTS: usize = 20;

/// Maximum concurrent requests for general API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Accounts (JWT auth)
/// - `POST /api/v1/accounts` - Register account
/// - `GET /api/v1/accounts/me` - Get current user's account
/// - `PATCH /api/v1/accounts/me` - Update profile (throttled)
/// - `DELETE /api/v1/accounts/me` - Delete account
///
/// ## Credits (JWT auth)
/// - `GET /api/v1/credits/balance` - Get current balance
/// - `POST /api/v1/credits/add` - Add purchased credits
/// - `POST /api/v1/credits/use` - Debit credits
/// - `GET /api/v1/credits/history` - List credit history
///
/// ## Images (JWT auth, credit guarded)
/// - `POST /api/v1/images/generate` - Text to image
/// - `POST /api/v1/images/upscale` - Upscale
/// - `POST /api/v1/images/uncrop` - Uncrop
/// - `POST /api/v1/images/remove-background` - Background removal
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);
    let guard = |operation| CreditGuard::new(Arc::clone(&state), operation);

    let image_routes = Router::new()
        .route(
            "/generate",
            post(images::generate).layer(from_fn_with_state(
                guard(ImageOperation::TextToImage),
                credit_guard,
            )),
        )
        .route(
            "/upscale",
            post(images::upscale).layer(from_fn_with_state(
                guard(ImageOperation::Upscale),
                credit_guard,
            )),
        )
        .route(
            "/uncrop",
            post(images::uncrop).layer(from_fn_with_state(
                guard(ImageOperation::Uncrop),
                credit_guard,
            )),
        )
        .route(
            "/remove-background",
            post(images::remove_background).layer(from_fn_with_state(
                guard(ImageOperation::RemoveBackground),
                credit_guard,
            )),
        )
        .layer(ConcurrencyLimitLayer::new(IMAGE_MAX_CONCURRENT_REQUESTS));

    let api_routes = Router::new()
        // Accounts
        .route("/accounts", post(accounts::create_account))
        .route(
            "/accounts/me",
            get(accounts::get_account)
                .patch(accounts::update_profile)
                .delete(accounts::delete_account),
        )
        // Credits
        .route("/credits/balance", get(credits::get_balance))
        .route("/credits/add", post(credits::add_credits))
        .route("/credits/use", post(credits::use_credits))
        .route("/credits/history", get(credits::credit_history))
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS))
        // Images (with their own concurrency limit)
        .nest("/images", image_routes);

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        .nest("/api/v1", api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let cors = if origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    cors.allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(CREDITS_REMAINING_HEADER)])
}
