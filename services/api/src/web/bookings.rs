//! services/api/src/web/bookings.rs
//!
//! Handlers for the authenticated user's bookings.

use crate::error::ApiError;
use crate::web::dto::{BookingResponse, CreateBookingRequest, ScheduleResponse};
use crate::web::middleware::CurrentUser;
use crate::web::extract::JsonBody;
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use home_services_core::BookingId;
use std::sync::Arc;
use tracing::info;

/// List the caller's bookings.
#[utoipa::path(
    get,
    path = "/api/bookings",
    responses(
        (status = 200, description = "The caller's bookings", body = [BookingResponse]),
        (status = 401, description = "No valid session")
    )
)]
pub async fn list_bookings_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let bookings = app_state.bookings.bookings_for_user(user_id).await?;
    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

/// The caller's bookings split into upcoming (soonest first) and past (latest first).
#[utoipa::path(
    get,
    path = "/api/bookings/schedule",
    responses(
        (status = 200, description = "Upcoming and past bookings", body = ScheduleResponse),
        (status = 401, description = "No valid session")
    )
)]
pub async fn booking_schedule_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let schedule = app_state
        .bookings
        .schedule_for_user(user_id, Utc::now())
        .await?;
    Ok(Json(schedule.into()))
}

/// Book a provider for a service at a given time.
#[utoipa::path(
    post,
    path = "/api/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = BookingResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "No valid session"),
        (status = 409, description = "The provider is already booked in that slot")
    )
)]
#[tracing::instrument(skip(app_state, payload))]
pub async fn create_booking_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    JsonBody(payload): JsonBody<CreateBookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = app_state
        .bookings
        .create_booking(user_id, payload.into(), Utc::now())
        .await?;
    info!(
        booking_id = booking.id,
        provider_id = booking.provider_id,
        "Booking created for {}",
        booking.appointment_date
    );
    Ok((StatusCode::CREATED, Json(BookingResponse::from(booking))))
}

/// Cancel one of the caller's bookings.
#[utoipa::path(
    delete,
    path = "/api/bookings/{id}",
    params(("id" = i64, Path, description = "Booking id")),
    responses(
        (status = 204, description = "Booking cancelled"),
        (status = 401, description = "No valid session"),
        (status = 403, description = "The booking belongs to another user"),
        (status = 404, description = "Booking not found")
    )
)]
#[tracing::instrument(skip(app_state))]
pub async fn cancel_booking_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(booking_id): Path<BookingId>,
) -> Result<StatusCode, ApiError> {
    app_state.bookings.cancel_booking(booking_id, user_id).await?;
    info!(booking_id, "Booking cancelled");
    Ok(StatusCode::NO_CONTENT)
}
