//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the public catalog and availability endpoints,
//! and the master definition for the OpenAPI specification.

use crate::error::ApiError;
use crate::web::dto::{
    AvailabilityQuery, AvailabilityResponse, BookingResponse, CreateBookingRequest,
    FavoriteRequest, MessageResponse, ProviderResponse, ScheduleResponse, SendMessageRequest,
    ServiceResponse, UserResponse,
};
use crate::web::state::AppState;
use crate::web::{auth, bookings, favorites, messages};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use home_services_core::availability::format_slot;
use home_services_core::ports::PortError;
use home_services_core::{ProviderId, ServiceId};
use std::sync::Arc;
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_services_handler,
        get_service_handler,
        list_service_providers_handler,
        get_provider_handler,
        list_provider_bookings_handler,
        provider_availability_handler,
        bookings::list_bookings_handler,
        bookings::booking_schedule_handler,
        bookings::create_booking_handler,
        bookings::cancel_booking_handler,
        favorites::list_favorites_handler,
        favorites::add_favorite_handler,
        favorites::remove_favorite_handler,
        messages::list_messaged_providers_handler,
        messages::get_thread_handler,
        messages::send_message_handler,
        auth::register_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::current_user_handler,
        auth::update_profile_handler,
    ),
    components(
        schemas(
            ServiceResponse, ProviderResponse, BookingResponse, CreateBookingRequest,
            ScheduleResponse, AvailabilityResponse, FavoriteRequest, SendMessageRequest,
            MessageResponse, UserResponse, auth::RegisterRequest, auth::LoginRequest,
            auth::ProfileUpdateRequest,
        )
    ),
    tags(
        (name = "Home Services API", description = "Service catalog, provider availability, bookings, favorites and messaging.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List every service in the catalog.
#[utoipa::path(
    get,
    path = "/api/services",
    responses((status = 200, description = "All services", body = [ServiceResponse]))
)]
pub async fn list_services_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<ServiceResponse>>, ApiError> {
    let services = app_state.store.list_services().await?;
    Ok(Json(services.into_iter().map(Into::into).collect()))
}

/// Get a single service.
#[utoipa::path(
    get,
    path = "/api/services/{id}",
    params(("id" = i64, Path, description = "Service id")),
    responses(
        (status = 200, description = "The service", body = ServiceResponse),
        (status = 404, description = "Service not found")
    )
)]
pub async fn get_service_handler(
    State(app_state): State<Arc<AppState>>,
    Path(service_id): Path<ServiceId>,
) -> Result<Json<ServiceResponse>, ApiError> {
    let service = app_state.store.get_service(service_id).await?;
    Ok(Json(service.into()))
}

/// List the providers that perform a service. Unknown services yield an empty list.
#[utoipa::path(
    get,
    path = "/api/services/{id}/providers",
    params(("id" = i64, Path, description = "Service id")),
    responses((status = 200, description = "Providers offering the service", body = [ProviderResponse]))
)]
pub async fn list_service_providers_handler(
    State(app_state): State<Arc<AppState>>,
    Path(service_id): Path<ServiceId>,
) -> Result<Json<Vec<ProviderResponse>>, ApiError> {
    let providers = app_state.store.list_providers_for_service(service_id).await?;
    Ok(Json(providers.into_iter().map(Into::into).collect()))
}

/// Get a single provider.
#[utoipa::path(
    get,
    path = "/api/providers/{id}",
    params(("id" = i64, Path, description = "Provider id")),
    responses(
        (status = 200, description = "The provider", body = ProviderResponse),
        (status = 404, description = "Provider not found")
    )
)]
pub async fn get_provider_handler(
    State(app_state): State<Arc<AppState>>,
    Path(provider_id): Path<ProviderId>,
) -> Result<Json<ProviderResponse>, ApiError> {
    let provider = app_state.store.get_provider(provider_id).await?;
    Ok(Json(provider.into()))
}

/// List every booking of a provider.
#[utoipa::path(
    get,
    path = "/api/providers/{id}/bookings",
    params(("id" = i64, Path, description = "Provider id")),
    responses((status = 200, description = "The provider's bookings", body = [BookingResponse]))
)]
pub async fn list_provider_bookings_handler(
    State(app_state): State<Arc<AppState>>,
    Path(provider_id): Path<ProviderId>,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let bookings = app_state.bookings.bookings_for_provider(provider_id).await?;
    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

/// Free slots of a provider on one day.
///
/// The result is advisory: it does not hold the slot for the caller.
#[utoipa::path(
    get,
    path = "/api/providers/{id}/availability",
    params(
        ("id" = i64, Path, description = "Provider id"),
        ("date" = String, Query, description = "Calendar day, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Free slots", body = AvailabilityResponse),
        (status = 400, description = "Malformed date"),
        (status = 404, description = "Provider not found")
    )
)]
pub async fn provider_availability_handler(
    State(app_state): State<Arc<AppState>>,
    Path(provider_id): Path<ProviderId>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let date = NaiveDate::parse_from_str(query.date.trim(), "%Y-%m-%d").map_err(|_| {
        PortError::Validation(format!("'{}' is not a valid YYYY-MM-DD date", query.date))
    })?;
    let slots = app_state
        .availability
        .available_slots(provider_id, date)
        .await?;
    Ok(Json(AvailabilityResponse {
        provider_id,
        date,
        slots: slots.into_iter().map(format_slot).collect(),
    }))
}
