//! services/api/src/adapters/memory.rs
//!
//! An in-process implementation of the `EntityStore` port.
//!
//! Every table lives behind a single `RwLock`, so id assignment and the
//! slot-uniqueness check in `create_booking` happen atomically with the insert.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use home_services_core::availability::same_slot;
use home_services_core::domain::{
    AuthSession, Booking, BookingId, BookingStatus, Message, MessageId, NewBooking, NewMessage,
    NewUser, ProfileUpdate, Provider, ProviderId, Service, ServiceId, User, UserCredentials,
    UserId,
};
use home_services_core::ports::{EntityStore, PortError, PortResult};
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::warn;

//=========================================================================================
// Table Layout
//=========================================================================================

struct UserRow {
    user: User,
    hashed_password: String,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, UserRow>,
    auth_sessions: HashMap<String, AuthSession>,
    services: BTreeMap<ServiceId, Service>,
    providers: BTreeMap<ProviderId, Provider>,
    bookings: BTreeMap<BookingId, Booking>,
    /// (user, provider) pairs in the order they were favorited.
    favorites: Vec<(UserId, ProviderId)>,
    messages: Vec<Message>,
    last_user_id: UserId,
    last_booking_id: BookingId,
    last_message_id: MessageId,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A store that keeps every collection in memory for the lifetime of the process.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose catalog is pre-filled with the given entries.
    pub fn with_catalog(services: Vec<Service>, providers: Vec<Provider>) -> Self {
        let tables = Tables {
            services: services.into_iter().map(|s| (s.id, s)).collect(),
            providers: providers.into_iter().map(|p| (p.id, p)).collect(),
            ..Tables::default()
        };
        Self {
            tables: RwLock::new(tables),
        }
    }

    fn read(&self) -> PortResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| {
            warn!("RwLock is poisoned, cannot read from the memory store");
            PortError::Unexpected("memory store lock poisoned".to_string())
        })
    }

    fn write(&self) -> PortResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| {
            warn!("RwLock is poisoned, cannot write to the memory store");
            PortError::Unexpected("memory store lock poisoned".to_string())
        })
    }
}

//=========================================================================================
// `EntityStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl EntityStore for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let mut tables = self.write()?;
        let taken = tables
            .users
            .values()
            .any(|row| row.user.username.eq_ignore_ascii_case(&new_user.username));
        if taken {
            return Err(PortError::Conflict(format!(
                "username '{}' is already taken",
                new_user.username
            )));
        }

        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            username: new_user.username,
            full_name: new_user.full_name,
            phone_number: new_user.phone_number,
            address: None,
            emergency_contact: None,
            emergency_phone: None,
        };
        tables.users.insert(
            user.id,
            UserRow {
                user: user.clone(),
                hashed_password: new_user.hashed_password,
            },
        );
        Ok(user)
    }

    async fn get_user(&self, user_id: UserId) -> PortResult<User> {
        self.read()?
            .users
            .get(&user_id)
            .map(|row| row.user.clone())
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn get_user_credentials(&self, username: &str) -> PortResult<UserCredentials> {
        self.read()?
            .users
            .values()
            .find(|row| row.user.username.eq_ignore_ascii_case(username))
            .map(|row| UserCredentials {
                user_id: row.user.id,
                username: row.user.username.clone(),
                hashed_password: row.hashed_password.clone(),
            })
            .ok_or_else(|| PortError::NotFound(format!("User '{}' not found", username)))
    }

    async fn update_user_profile(
        &self,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> PortResult<User> {
        let mut tables = self.write()?;
        let row = tables
            .users
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        let user = &mut row.user;
        if let Some(full_name) = update.full_name {
            user.full_name = Some(full_name);
        }
        if let Some(phone_number) = update.phone_number {
            user.phone_number = Some(phone_number);
        }
        if let Some(address) = update.address {
            user.address = Some(address);
        }
        if let Some(emergency_contact) = update.emergency_contact {
            user.emergency_contact = Some(emergency_contact);
        }
        if let Some(emergency_phone) = update.emergency_phone {
            user.emergency_phone = Some(emergency_phone);
        }
        Ok(user.clone())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let mut tables = self.write()?;
        let now = Utc::now();
        tables.auth_sessions.retain(|_, session| session.expires_at > now);
        tables.auth_sessions.insert(
            session_id.to_string(),
            AuthSession {
                id: session_id.to_string(),
                user_id,
                expires_at,
            },
        );
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<UserId> {
        let tables = self.read()?;
        match tables.auth_sessions.get(session_id) {
            Some(session) if session.expires_at > Utc::now() => Ok(session.user_id),
            _ => Err(PortError::Unauthenticated),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.write()?.auth_sessions.remove(session_id);
        Ok(())
    }

    async fn list_services(&self) -> PortResult<Vec<Service>> {
        Ok(self.read()?.services.values().cloned().collect())
    }

    async fn get_service(&self, service_id: ServiceId) -> PortResult<Service> {
        self.read()?
            .services
            .get(&service_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Service {} not found", service_id)))
    }

    async fn get_provider(&self, provider_id: ProviderId) -> PortResult<Provider> {
        self.read()?
            .providers
            .get(&provider_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Provider {} not found", provider_id)))
    }

    async fn list_providers_for_service(
        &self,
        service_id: ServiceId,
    ) -> PortResult<Vec<Provider>> {
        Ok(self
            .read()?
            .providers
            .values()
            .filter(|p| p.offers(service_id))
            .cloned()
            .collect())
    }

    async fn create_booking(
        &self,
        booking: NewBooking,
        enforce_unique_slot: bool,
    ) -> PortResult<Booking> {
        let mut tables = self.write()?;
        if enforce_unique_slot {
            let taken = tables.bookings.values().any(|existing| {
                existing.provider_id == booking.provider_id
                    && existing.status == BookingStatus::Scheduled
                    && same_slot(existing.appointment_date, booking.appointment_date)
            });
            if taken {
                return Err(PortError::Conflict(format!(
                    "provider {} is already booked at {}",
                    booking.provider_id,
                    booking.appointment_date.format("%Y-%m-%d %H:%M")
                )));
            }
        }

        tables.last_booking_id += 1;
        let stored = Booking {
            id: tables.last_booking_id,
            user_id: booking.user_id,
            service_id: booking.service_id,
            provider_id: booking.provider_id,
            appointment_date: booking.appointment_date,
            notes: booking.notes,
            status: BookingStatus::Scheduled,
        };
        tables.bookings.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_booking(&self, booking_id: BookingId) -> PortResult<Booking> {
        self.read()?
            .bookings
            .get(&booking_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Booking {} not found", booking_id)))
    }

    async fn list_bookings_for_user(&self, user_id: UserId) -> PortResult<Vec<Booking>> {
        Ok(self
            .read()?
            .bookings
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_bookings_for_provider(
        &self,
        provider_id: ProviderId,
    ) -> PortResult<Vec<Booking>> {
        Ok(self
            .read()?
            .bookings
            .values()
            .filter(|b| b.provider_id == provider_id)
            .cloned()
            .collect())
    }

    async fn delete_booking(&self, booking_id: BookingId) -> PortResult<()> {
        self.write()?
            .bookings
            .remove(&booking_id)
            .map(|_| ())
            .ok_or_else(|| PortError::NotFound(format!("Booking {} not found", booking_id)))
    }

    async fn add_favorite(&self, user_id: UserId, provider_id: ProviderId) -> PortResult<()> {
        let mut tables = self.write()?;
        if !tables.favorites.contains(&(user_id, provider_id)) {
            tables.favorites.push((user_id, provider_id));
        }
        Ok(())
    }

    async fn remove_favorite(&self, user_id: UserId, provider_id: ProviderId) -> PortResult<()> {
        self.write()?
            .favorites
            .retain(|pair| *pair != (user_id, provider_id));
        Ok(())
    }

    async fn list_favorite_provider_ids(&self, user_id: UserId) -> PortResult<Vec<ProviderId>> {
        Ok(self
            .read()?
            .favorites
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, provider_id)| *provider_id)
            .collect())
    }

    async fn is_favorite(&self, user_id: UserId, provider_id: ProviderId) -> PortResult<bool> {
        Ok(self.read()?.favorites.contains(&(user_id, provider_id)))
    }

    async fn create_message(&self, message: NewMessage) -> PortResult<Message> {
        let mut tables = self.write()?;
        tables.last_message_id += 1;
        let stored = Message {
            id: tables.last_message_id,
            user_id: message.user_id,
            provider_id: message.provider_id,
            content: message.content,
            from_user: message.from_user,
            timestamp: message.timestamp,
        };
        tables.messages.push(stored.clone());
        Ok(stored)
    }

    async fn list_messages(
        &self,
        user_id: UserId,
        provider_id: ProviderId,
    ) -> PortResult<Vec<Message>> {
        let mut thread: Vec<Message> = self
            .read()?
            .messages
            .iter()
            .filter(|m| m.user_id == user_id && m.provider_id == provider_id)
            .cloned()
            .collect();
        thread.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        Ok(thread)
    }

    async fn list_messaged_provider_ids(&self, user_id: UserId) -> PortResult<Vec<ProviderId>> {
        let tables = self.read()?;
        let mut ids: Vec<ProviderId> = Vec::new();
        for message in tables.messages.iter().filter(|m| m.user_id == user_id) {
            if !ids.contains(&message.provider_id) {
                ids.push(message.provider_id);
            }
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn new_booking(provider_id: ProviderId, at: DateTime<Utc>) -> NewBooking {
        NewBooking {
            user_id: 1,
            service_id: 1,
            provider_id,
            appointment_date: at,
            notes: None,
        }
    }

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            hashed_password: "hash".to_string(),
            full_name: None,
            phone_number: None,
        }
    }

    #[tokio::test]
    async fn booking_ids_are_not_reused_after_delete() {
        let store = MemoryStore::new();
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();

        let first = store.create_booking(new_booking(1, at), false).await.unwrap();
        store.delete_booking(first.id).await.unwrap();
        let second = store.create_booking(new_booking(1, at), false).await.unwrap();

        assert!(second.id > first.id);
        assert_eq!(second.status, BookingStatus::Scheduled);
    }

    #[tokio::test]
    async fn unique_slot_is_checked_per_provider() {
        let store = MemoryStore::new();
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();

        store.create_booking(new_booking(1, at), true).await.unwrap();
        let clash = store.create_booking(new_booking(1, at), true).await;
        assert!(matches!(clash, Err(PortError::Conflict(_))));

        store.create_booking(new_booking(2, at), true).await.unwrap();
        store
            .create_booking(new_booking(1, at + Duration::hours(1)), true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn deleting_a_missing_booking_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.delete_booking(42).await,
            Err(PortError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn usernames_are_unique_ignoring_case() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("Alice")).await.unwrap();

        let creds = store.get_user_credentials("alice").await.unwrap();
        assert_eq!(creds.user_id, user.id);

        let duplicate = store.create_user(new_user("ALICE")).await;
        assert!(matches!(duplicate, Err(PortError::Conflict(_))));
    }

    #[tokio::test]
    async fn profile_update_leaves_unset_fields_alone() {
        let store = MemoryStore::new();
        let mut registration = new_user("bob");
        registration.phone_number = Some("555-0100".to_string());
        let user = store.create_user(registration).await.unwrap();

        let updated = store
            .update_user_profile(
                user.id,
                ProfileUpdate {
                    address: Some("1 Main St".to_string()),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.address.as_deref(), Some("1 Main St"));
        assert_eq!(updated.phone_number.as_deref(), Some("555-0100"));
    }

    #[tokio::test]
    async fn expired_sessions_do_not_validate() {
        let store = MemoryStore::new();
        store
            .create_auth_session("old", 1, Utc::now() - Duration::minutes(1))
            .await
            .unwrap();
        store
            .create_auth_session("fresh", 1, Utc::now() + Duration::days(1))
            .await
            .unwrap();

        assert_eq!(
            store.validate_auth_session("old").await,
            Err(PortError::Unauthenticated)
        );
        assert_eq!(store.validate_auth_session("fresh").await, Ok(1));

        store.delete_auth_session("fresh").await.unwrap();
        assert_eq!(
            store.validate_auth_session("fresh").await,
            Err(PortError::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn starting_a_session_purges_expired_ones() {
        let store = MemoryStore::new();
        store
            .create_auth_session("stale", 1, Utc::now() - Duration::days(1))
            .await
            .unwrap();
        store
            .create_auth_session("live", 2, Utc::now() + Duration::days(1))
            .await
            .unwrap();

        let tables = store.read().unwrap();
        assert!(!tables.auth_sessions.contains_key("stale"));
        assert!(tables.auth_sessions.contains_key("live"));
    }

    #[tokio::test]
    async fn favorites_keep_the_order_they_were_added_in() {
        let store = MemoryStore::new();
        for provider_id in [4, 1, 3, 1] {
            store.add_favorite(9, provider_id).await.unwrap();
        }
        store.add_favorite(10, 2).await.unwrap();
        assert_eq!(
            store.list_favorite_provider_ids(9).await.unwrap(),
            vec![4, 1, 3]
        );

        store.remove_favorite(9, 1).await.unwrap();
        store.add_favorite(9, 1).await.unwrap();
        assert_eq!(
            store.list_favorite_provider_ids(9).await.unwrap(),
            vec![4, 3, 1]
        );
        assert_eq!(store.list_favorite_provider_ids(10).await.unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn messaged_providers_are_distinct_in_first_contact_order() {
        let store = MemoryStore::new();
        let now = Utc::now();
        for provider_id in [3, 1, 3, 2, 1] {
            store
                .create_message(NewMessage {
                    user_id: 7,
                    provider_id,
                    content: "hi".to_string(),
                    from_user: true,
                    timestamp: now,
                })
                .await
                .unwrap();
        }
        assert_eq!(
            store.list_messaged_provider_ids(7).await.unwrap(),
            vec![3, 1, 2]
        );
        assert!(store.list_messaged_provider_ids(8).await.unwrap().is_empty());
    }
}
