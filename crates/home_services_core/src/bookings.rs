//! crates/home_services_core/src/bookings.rs
//!
//! The booking lifecycle: validating and creating bookings, cancelling them on
//! behalf of their owner, and splitting a user's bookings into upcoming and past.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::sync::Arc;

use crate::domain::{Booking, BookingId, NewBooking, ProviderId, ServiceId, UserId};
use crate::ports::{EntityStore, PortError, PortResult};

/// Write-time rules applied when a booking is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingPolicy {
    /// Reject a booking whose provider already has one in the same slot.
    pub enforce_unique_slot: bool,
    /// Reject appointment dates earlier than the current time.
    pub require_future: bool,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            enforce_unique_slot: true,
            require_future: false,
        }
    }
}

/// Raw booking input as submitted by a client. Every field is optional so that
/// missing values surface as validation errors rather than decode failures.
#[derive(Debug, Clone, Default)]
pub struct BookingRequest {
    pub service_id: Option<ServiceId>,
    pub provider_id: Option<ProviderId>,
    pub appointment_date: Option<String>,
    pub notes: Option<String>,
}

/// A user's bookings split around a reference instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingSchedule {
    /// Appointments at or after the reference instant, soonest first.
    pub upcoming: Vec<Booking>,
    /// Appointments before the reference instant, most recent first.
    pub past: Vec<Booking>,
}

/// Parses an appointment timestamp.
///
/// Accepts RFC 3339 with any offset, or a naive `YYYY-MM-DDTHH:MM[:SS]` which
/// is taken as UTC.
pub fn parse_appointment_date(raw: &str) -> PortResult<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| PortError::Validation(format!("'{}' is not a valid appointment date", raw)))
}

pub fn partition_bookings(bookings: Vec<Booking>, now: DateTime<Utc>) -> BookingSchedule {
    let (mut upcoming, mut past): (Vec<Booking>, Vec<Booking>) = bookings
        .into_iter()
        .partition(|b| b.appointment_date >= now);
    upcoming.sort_by(|a, b| a.appointment_date.cmp(&b.appointment_date));
    past.sort_by(|a, b| b.appointment_date.cmp(&a.appointment_date));
    BookingSchedule { upcoming, past }
}

/// Orchestrates booking creation and cancellation on top of the entity store.
#[derive(Clone)]
pub struct BookingManager {
    store: Arc<dyn EntityStore>,
    policy: BookingPolicy,
}

impl BookingManager {
    pub fn new(store: Arc<dyn EntityStore>, policy: BookingPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> BookingPolicy {
        self.policy
    }

    /// Validates the request and stores a new `scheduled` booking for `user_id`.
    pub async fn create_booking(
        &self,
        user_id: UserId,
        request: BookingRequest,
        now: DateTime<Utc>,
    ) -> PortResult<Booking> {
        let service_id = request
            .service_id
            .ok_or_else(|| PortError::Validation("serviceId is required".to_string()))?;
        let provider_id = request
            .provider_id
            .ok_or_else(|| PortError::Validation("providerId is required".to_string()))?;
        let raw_date = request
            .appointment_date
            .ok_or_else(|| PortError::Validation("appointmentDate is required".to_string()))?;
        let appointment_date = parse_appointment_date(&raw_date)?;

        if self.policy.require_future && appointment_date < now {
            return Err(PortError::Validation(
                "appointmentDate must be in the future".to_string(),
            ));
        }

        let notes = request
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let booking = NewBooking {
            user_id,
            service_id,
            provider_id,
            appointment_date,
            notes,
        };
        self.store
            .create_booking(booking, self.policy.enforce_unique_slot)
            .await
    }

    /// Hard-deletes a booking owned by `requesting_user`.
    pub async fn cancel_booking(
        &self,
        booking_id: BookingId,
        requesting_user: UserId,
    ) -> PortResult<()> {
        let booking = self.store.get_booking(booking_id).await?;
        if booking.user_id != requesting_user {
            return Err(PortError::Forbidden(format!(
                "booking {} belongs to another user",
                booking_id
            )));
        }
        self.store.delete_booking(booking_id).await
    }

    pub async fn bookings_for_user(&self, user_id: UserId) -> PortResult<Vec<Booking>> {
        self.store.list_bookings_for_user(user_id).await
    }

    pub async fn bookings_for_provider(&self, provider_id: ProviderId) -> PortResult<Vec<Booking>> {
        self.store.list_bookings_for_provider(provider_id).await
    }

    pub async fn schedule_for_user(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> PortResult<BookingSchedule> {
        let bookings = self.store.list_bookings_for_user(user_id).await?;
        Ok(partition_bookings(bookings, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BookingStatus;
    use chrono::{Duration, TimeZone};

    fn booking(id: BookingId, at: DateTime<Utc>) -> Booking {
        Booking {
            id,
            user_id: 1,
            service_id: 1,
            provider_id: 1,
            appointment_date: at,
            notes: None,
            status: BookingStatus::Scheduled,
        }
    }

    #[test]
    fn partition_splits_around_now_and_orders_each_side() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let bookings = vec![
            booking(1, now + Duration::days(10)),
            booking(2, now - Duration::days(1)),
            booking(3, now + Duration::hours(1)),
            booking(4, now - Duration::days(3)),
        ];

        let schedule = partition_bookings(bookings, now);

        let upcoming: Vec<BookingId> = schedule.upcoming.iter().map(|b| b.id).collect();
        let past: Vec<BookingId> = schedule.past.iter().map(|b| b.id).collect();
        assert_eq!(upcoming, vec![3, 1]);
        assert_eq!(past, vec![2, 4]);
    }

    #[test]
    fn booking_exactly_at_now_is_upcoming() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let schedule = partition_bookings(vec![booking(1, now)], now);
        assert_eq!(schedule.upcoming.len(), 1);
        assert!(schedule.past.is_empty());
    }

    #[test]
    fn parses_client_date_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        for raw in [
            "2024-06-01T10:00:00Z",
            "2024-06-01T10:00:00.000Z",
            "2024-06-01T12:00:00+02:00",
            "2024-06-01T10:00",
            "2024-06-01T10:00:00",
            " 2024-06-01 10:00 ",
        ] {
            assert_eq!(parse_appointment_date(raw), Ok(expected), "input {raw:?}");
        }
    }

    #[test]
    fn rejects_unparseable_dates() {
        for raw in ["", "tomorrow", "2024-13-01T10:00", "2024-06-01"] {
            assert!(
                matches!(parse_appointment_date(raw), Err(PortError::Validation(_))),
                "input {raw:?}"
            );
        }
    }
}
