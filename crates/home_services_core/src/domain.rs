//! crates/home_services_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

pub type UserId = i64;
pub type ServiceId = i64;
pub type ProviderId = i64;
pub type BookingId = i64;
pub type MessageId = i64;

// Represents a user - used throughout app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: UserId,
    pub username: String,
    pub hashed_password: String,
}

/// The data needed to register a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub hashed_password: String,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
}

/// A partial profile update. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

/// A category of home help offered through the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    pub short_description: String,
    pub description: String,
    pub icon: String,
    pub inclusions: Vec<String>,
}

/// A worker who performs one or more services.
///
/// Per-user state such as the favorite flag is never stored here; see
/// [`ProviderView`].
#[derive(Debug, Clone, PartialEq)]
pub struct Provider {
    pub id: ProviderId,
    pub name: String,
    pub experience: String,
    pub rating: f64,
    pub reviews: i32,
    pub tags: Vec<String>,
    pub service_ids: Vec<ServiceId>,
}

impl Provider {
    pub fn offers(&self, service_id: ServiceId) -> bool {
        self.service_ids.contains(&service_id)
    }
}

/// A provider as seen by one particular user.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderView {
    pub provider: Provider,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Scheduled => "scheduled",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown booking status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for BookingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(BookingStatus::Scheduled),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A scheduled appointment between a user and a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub service_id: ServiceId,
    pub provider_id: ProviderId,
    pub appointment_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub status: BookingStatus,
}

/// A validated booking that has not been assigned an id yet.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: UserId,
    pub service_id: ServiceId,
    pub provider_id: ProviderId,
    pub appointment_date: DateTime<Utc>,
    pub notes: Option<String>,
}

/// A single message in the thread between a user and a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub user_id: UserId,
    pub provider_id: ProviderId,
    pub content: String,
    pub from_user: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub user_id: UserId,
    pub provider_id: ProviderId,
    pub content: String,
    pub from_user: bool,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_status_parses_its_own_rendering() {
        for status in [
            BookingStatus::Scheduled,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<BookingStatus>(), Ok(status));
        }
        assert!("pending".parse::<BookingStatus>().is_err());
    }
}
