//! services/api/src/web/router.rs
//!
//! Assembles the HTTP routes, their auth requirements and the CORS policy.

use crate::error::ApiError;
use crate::web::{
    auth::{
        current_user_handler, login_handler, logout_handler, register_handler,
        update_profile_handler,
    },
    bookings::{
        booking_schedule_handler, cancel_booking_handler, create_booking_handler,
        list_bookings_handler,
    },
    favorites::{add_favorite_handler, list_favorites_handler, remove_favorite_handler},
    messages::{get_thread_handler, list_messaged_providers_handler, send_message_handler},
    middleware::require_auth,
    rest::{
        get_provider_handler, get_service_handler, list_provider_bookings_handler,
        list_service_providers_handler, list_services_handler, provider_availability_handler,
    },
    state::AppState,
};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Builds the complete API router for the given state.
pub fn build_router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = app_state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid CORS origin: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/register", post(register_handler))
        .route("/api/login", post(login_handler))
        .route("/api/logout", post(logout_handler))
        .route("/api/services", get(list_services_handler))
        .route("/api/services/{id}", get(get_service_handler))
        .route("/api/services/{id}/providers", get(list_service_providers_handler))
        .route("/api/providers/service/{id}", get(list_service_providers_handler))
        .route("/api/providers/{id}", get(get_provider_handler))
        .route("/api/providers/{id}/bookings", get(list_provider_bookings_handler))
        .route("/api/providers/{id}/availability", get(provider_availability_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/api/user", get(current_user_handler))
        .route("/api/user/profile", patch(update_profile_handler))
        .route("/api/bookings", get(list_bookings_handler).post(create_booking_handler))
        .route("/api/bookings/schedule", get(booking_schedule_handler))
        .route("/api/bookings/{id}", delete(cancel_booking_handler))
        .route("/api/user/favorites", get(list_favorites_handler).post(add_favorite_handler))
        .route("/api/user/favorites/{provider_id}", delete(remove_favorite_handler))
        .route("/api/messages", post(send_message_handler))
        .route("/api/messages/providers", get(list_messaged_providers_handler))
        .route("/api/messages/provider/{provider_id}", get(get_thread_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Ok(Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(app_state))
}
