//! crates/home_services_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific storage implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Booking, BookingId, Message, NewBooking, NewMessage, NewUser, ProfileUpdate, Provider,
    ProviderId, Service, ServiceId, User, UserCredentials, UserId,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port and domain operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unauthenticated")]
    Unauthenticated,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The authoritative holder of every entity collection.
///
/// Implementations own id generation, which must be monotonic and never reuse
/// an id, even after the entity is deleted. No referential integrity is
/// checked: a booking may point at a provider that does not exist.
#[async_trait]
pub trait EntityStore: Send + Sync {
    // --- User Management ---
    async fn create_user(&self, user: NewUser) -> PortResult<User>;

    async fn get_user(&self, user_id: UserId) -> PortResult<User>;

    /// Looks a user up by username, ignoring ASCII case.
    async fn get_user_credentials(&self, username: &str) -> PortResult<UserCredentials>;

    async fn update_user_profile(
        &self,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> PortResult<User>;

    // --- Auth Sessions ---
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Returns `PortError::Unauthenticated` for unknown or expired sessions.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<UserId>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Catalog ---
    async fn list_services(&self) -> PortResult<Vec<Service>>;

    async fn get_service(&self, service_id: ServiceId) -> PortResult<Service>;

    async fn get_provider(&self, provider_id: ProviderId) -> PortResult<Provider>;

    async fn list_providers_for_service(&self, service_id: ServiceId)
        -> PortResult<Vec<Provider>>;

    // --- Bookings ---
    /// Stores a booking with status `scheduled`.
    ///
    /// When `enforce_unique_slot` is set, the store rejects the booking with
    /// `PortError::Conflict` if a scheduled booking of the same provider already
    /// occupies the same day and time of day. The check and the insert are atomic.
    async fn create_booking(
        &self,
        booking: NewBooking,
        enforce_unique_slot: bool,
    ) -> PortResult<Booking>;

    async fn get_booking(&self, booking_id: BookingId) -> PortResult<Booking>;

    async fn list_bookings_for_user(&self, user_id: UserId) -> PortResult<Vec<Booking>>;

    async fn list_bookings_for_provider(&self, provider_id: ProviderId)
        -> PortResult<Vec<Booking>>;

    async fn delete_booking(&self, booking_id: BookingId) -> PortResult<()>;

    // --- Favorites ---
    async fn add_favorite(&self, user_id: UserId, provider_id: ProviderId) -> PortResult<()>;

    async fn remove_favorite(&self, user_id: UserId, provider_id: ProviderId) -> PortResult<()>;

    async fn list_favorite_provider_ids(&self, user_id: UserId) -> PortResult<Vec<ProviderId>>;

    async fn is_favorite(&self, user_id: UserId, provider_id: ProviderId) -> PortResult<bool>;

    // --- Messages ---
    async fn create_message(&self, message: NewMessage) -> PortResult<Message>;

    /// Returns the thread ordered by timestamp, then id.
    async fn list_messages(
        &self,
        user_id: UserId,
        provider_id: ProviderId,
    ) -> PortResult<Vec<Message>>;

    /// Distinct providers the user has exchanged messages with, in first-contact order.
    async fn list_messaged_provider_ids(&self, user_id: UserId) -> PortResult<Vec<ProviderId>>;
}
