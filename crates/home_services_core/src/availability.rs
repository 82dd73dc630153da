//! crates/home_services_core/src/availability.rs
//!
//! Computes which slots of the daily template a provider still has free.
//!
//! A booking is a point in time, not an interval: it consumes exactly the slot
//! that shares its calendar day (UTC) and its hour and minute.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use std::sync::Arc;

use crate::domain::{Booking, BookingStatus, ProviderId};
use crate::ports::{EntityStore, PortError, PortResult};

const SLOT_FORMAT: &str = "%H:%M";

/// The ordered list of times of day a provider can be booked at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotTemplate {
    slots: Vec<NaiveTime>,
}

impl SlotTemplate {
    /// Hourly slots from 08:00 through 17:00.
    pub fn hourly_business_day() -> Self {
        let slots = (8..=17)
            .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
            .collect();
        Self { slots }
    }

    /// Parses `"HH:MM"` entries, keeping their order and dropping duplicates.
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> PortResult<Self> {
        let mut slots: Vec<NaiveTime> = Vec::with_capacity(entries.len());
        for entry in entries {
            let entry = entry.as_ref().trim();
            let slot = NaiveTime::parse_from_str(entry, SLOT_FORMAT).map_err(|_| {
                PortError::Validation(format!("'{}' is not a valid HH:MM slot", entry))
            })?;
            if !slots.contains(&slot) {
                slots.push(slot);
            }
        }
        if slots.is_empty() {
            return Err(PortError::Validation(
                "slot template must contain at least one slot".to_string(),
            ));
        }
        Ok(Self { slots })
    }

    pub fn slots(&self) -> &[NaiveTime] {
        &self.slots
    }
}

impl Default for SlotTemplate {
    fn default() -> Self {
        Self::hourly_business_day()
    }
}

/// Renders a slot the way clients send and display it.
pub fn format_slot(slot: NaiveTime) -> String {
    slot.format(SLOT_FORMAT).to_string()
}

/// True when both instants fall on the same day, hour and minute.
pub fn same_slot(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.date_naive() == b.date_naive() && a.hour() == b.hour() && a.minute() == b.minute()
}

fn occupies(booking: &Booking, day: NaiveDate, slot: NaiveTime) -> bool {
    if booking.status == BookingStatus::Cancelled {
        return false;
    }
    let at = booking.appointment_date;
    at.date_naive() == day && at.hour() == slot.hour() && at.minute() == slot.minute()
}

/// Returns the template slots on `day` that none of `bookings` occupies.
pub fn free_slots(template: &SlotTemplate, bookings: &[Booking], day: NaiveDate) -> Vec<NaiveTime> {
    template
        .slots()
        .iter()
        .copied()
        .filter(|slot| !bookings.iter().any(|b| occupies(b, day, *slot)))
        .collect()
}

/// Read-side availability queries. Nothing here reserves a slot; uniqueness at
/// write time is the store's job.
#[derive(Clone)]
pub struct AvailabilityChecker {
    store: Arc<dyn EntityStore>,
    template: SlotTemplate,
}

impl AvailabilityChecker {
    pub fn new(store: Arc<dyn EntityStore>, template: SlotTemplate) -> Self {
        Self { store, template }
    }

    pub fn template(&self) -> &SlotTemplate {
        &self.template
    }

    /// Free slots of an existing provider on the given day.
    pub async fn available_slots(
        &self,
        provider_id: ProviderId,
        day: NaiveDate,
    ) -> PortResult<Vec<NaiveTime>> {
        self.store.get_provider(provider_id).await?;
        let bookings = self.store.list_bookings_for_provider(provider_id).await?;
        Ok(free_slots(&self.template, &bookings, day))
    }

    /// Whether `at` is a template slot that is still free for the provider.
    pub async fn is_open(&self, provider_id: ProviderId, at: DateTime<Utc>) -> PortResult<bool> {
        let day = at.date_naive();
        let slots = self.available_slots(provider_id, day).await?;
        Ok(slots
            .iter()
            .any(|slot| slot.hour() == at.hour() && slot.minute() == at.minute()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn booking_at(provider_id: ProviderId, at: DateTime<Utc>, status: BookingStatus) -> Booking {
        Booking {
            id: 1,
            user_id: 1,
            service_id: 1,
            provider_id,
            appointment_date: at,
            notes: None,
            status,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn default_template_is_hourly_eight_to_five() {
        let rendered: Vec<String> = SlotTemplate::default()
            .slots()
            .iter()
            .map(|s| format_slot(*s))
            .collect();
        assert_eq!(
            rendered,
            vec![
                "08:00", "09:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00",
                "17:00"
            ]
        );
    }

    #[test]
    fn parse_rejects_garbage_and_empty_templates() {
        assert!(matches!(
            SlotTemplate::parse(&["9am"]),
            Err(PortError::Validation(_))
        ));
        let empty: [&str; 0] = [];
        assert!(matches!(
            SlotTemplate::parse(&empty),
            Err(PortError::Validation(_))
        ));
        let parsed = SlotTemplate::parse(&[" 09:30", "09:30", "14:00"]).unwrap();
        assert_eq!(parsed.slots().len(), 2);
    }

    #[test]
    fn booked_slot_is_removed_only_on_its_own_day() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        let bookings = vec![booking_at(1, at, BookingStatus::Scheduled)];
        let template = SlotTemplate::default();

        let same_day = free_slots(&template, &bookings, day(2024, 6, 1));
        assert_eq!(same_day.len(), 9);
        assert!(!same_day.contains(&NaiveTime::from_hms_opt(10, 0, 0).unwrap()));

        let next_day = free_slots(&template, &bookings, day(2024, 6, 2));
        assert_eq!(next_day.len(), 10);
    }

    #[test]
    fn seconds_do_not_matter_but_minutes_do() {
        let template = SlotTemplate::default();
        let with_seconds = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 42).unwrap();
        let off_slot = Utc.with_ymd_and_hms(2024, 6, 1, 11, 30, 0).unwrap();
        let bookings = vec![
            booking_at(1, with_seconds, BookingStatus::Scheduled),
            booking_at(1, off_slot, BookingStatus::Scheduled),
        ];
        let free = free_slots(&template, &bookings, day(2024, 6, 1));
        assert!(!free.contains(&NaiveTime::from_hms_opt(9, 0, 0).unwrap()));
        assert!(free.contains(&NaiveTime::from_hms_opt(11, 0, 0).unwrap()));
        assert_eq!(free.len(), 9);
    }

    #[test]
    fn cancelled_bookings_leave_the_slot_open() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 15, 0, 0).unwrap();
        let bookings = vec![booking_at(1, at, BookingStatus::Cancelled)];
        let free = free_slots(&SlotTemplate::default(), &bookings, day(2024, 6, 1));
        assert_eq!(free.len(), 10);
    }

    #[test]
    fn same_slot_ignores_seconds() {
        let a = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 59).unwrap();
        let c = Utc.with_ymd_and_hms(2024, 6, 2, 10, 0, 0).unwrap();
        assert!(same_slot(a, b));
        assert!(!same_slot(a, c));
    }
}
