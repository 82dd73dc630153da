//! services/api/src/web/dto.rs
//!
//! JSON request and response bodies. Field names are camelCase on the wire.

use chrono::{DateTime, NaiveDate, Utc};
use home_services_core::{
    Booking, BookingRequest, BookingSchedule, Message, Provider, ProviderView, Service, User,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

//=========================================================================================
// Catalog
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    pub id: i64,
    pub name: String,
    pub short_description: String,
    pub description: String,
    pub icon: String,
    pub inclusions: Vec<String>,
}

impl From<Service> for ServiceResponse {
    fn from(s: Service) -> Self {
        Self {
            id: s.id,
            name: s.name,
            short_description: s.short_description,
            description: s.description,
            icon: s.icon,
            inclusions: s.inclusions,
        }
    }
}

/// A provider. `isFavorite` is present only on per-user listings.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResponse {
    pub id: i64,
    pub name: String,
    pub experience: String,
    pub rating: f64,
    pub reviews: i32,
    pub tags: Vec<String>,
    pub service_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl ProviderResponse {
    fn build(p: Provider, is_favorite: Option<bool>) -> Self {
        Self {
            id: p.id,
            name: p.name,
            experience: p.experience,
            rating: p.rating,
            reviews: p.reviews,
            tags: p.tags,
            service_ids: p.service_ids,
            is_favorite,
        }
    }
}

impl From<Provider> for ProviderResponse {
    fn from(p: Provider) -> Self {
        Self::build(p, None)
    }
}

impl From<ProviderView> for ProviderResponse {
    fn from(view: ProviderView) -> Self {
        Self::build(view.provider, Some(view.is_favorite))
    }
}

//=========================================================================================
// Bookings and Availability
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: i64,
    pub user_id: i64,
    pub service_id: i64,
    pub provider_id: i64,
    pub appointment_date: DateTime<Utc>,
    pub notes: Option<String>,
    /// One of `scheduled`, `completed`, `cancelled`.
    pub status: String,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            user_id: b.user_id,
            service_id: b.service_id,
            provider_id: b.provider_id,
            appointment_date: b.appointment_date,
            notes: b.notes,
            status: b.status.to_string(),
        }
    }
}

/// Booking input. Missing fields are reported as validation errors.
#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub service_id: Option<i64>,
    pub provider_id: Option<i64>,
    /// RFC 3339 timestamp, or `YYYY-MM-DDTHH:MM` taken as UTC.
    pub appointment_date: Option<String>,
    pub notes: Option<String>,
}

impl From<CreateBookingRequest> for BookingRequest {
    fn from(req: CreateBookingRequest) -> Self {
        Self {
            service_id: req.service_id,
            provider_id: req.provider_id,
            appointment_date: req.appointment_date,
            notes: req.notes,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ScheduleResponse {
    pub upcoming: Vec<BookingResponse>,
    pub past: Vec<BookingResponse>,
}

impl From<BookingSchedule> for ScheduleResponse {
    fn from(s: BookingSchedule) -> Self {
        Self {
            upcoming: s.upcoming.into_iter().map(Into::into).collect(),
            past: s.past.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    /// Calendar day as `YYYY-MM-DD`.
    pub date: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub provider_id: i64,
    pub date: NaiveDate,
    /// Free slots as `HH:MM`, in template order.
    pub slots: Vec<String>,
}

//=========================================================================================
// Favorites and Messages
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    pub provider_id: i64,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub provider_id: i64,
    #[serde(default)]
    pub content: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: i64,
    pub user_id: i64,
    pub provider_id: i64,
    pub content: String,
    pub from_user: bool,
    pub timestamp: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            provider_id: m.provider_id,
            content: m.content,
            from_user: m.from_user,
            timestamp: m.timestamp,
        }
    }
}

//=========================================================================================
// Users
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            full_name: u.full_name,
            phone_number: u.phone_number,
            address: u.address,
            emergency_contact: u.emergency_contact,
            emergency_phone: u.emergency_phone,
        }
    }
}
