//! services/api/src/adapters/postgres.rs
//!
//! This module contains the PostgreSQL adapter, a concrete implementation of the
//! `EntityStore` port from the `core` crate. It handles all interactions with the
//! database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use home_services_core::domain::{
    Booking, BookingId, BookingStatus, Message, NewBooking, NewMessage, NewUser, ProfileUpdate,
    Provider, ProviderId, Service, ServiceId, User, UserCredentials, UserId,
};
use home_services_core::ports::{EntityStore, PortError, PortResult};
use sqlx::{FromRow, PgPool};

const UNIQUE_VIOLATION: &str = "23505";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `EntityStore` port.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Inserts catalog entries that are not present yet. Existing rows are left untouched.
    pub async fn seed_catalog(
        &self,
        services: &[Service],
        providers: &[Provider],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for service in services {
            sqlx::query(
                "INSERT INTO services (id, name, short_description, description, icon, inclusions) \
                 VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT (id) DO NOTHING",
            )
            .bind(service.id)
            .bind(&service.name)
            .bind(&service.short_description)
            .bind(&service.description)
            .bind(&service.icon)
            .bind(&service.inclusions)
            .execute(&mut *tx)
            .await?;
        }
        for provider in providers {
            sqlx::query(
                "INSERT INTO providers (id, name, experience, rating, reviews, tags, service_ids) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) ON CONFLICT (id) DO NOTHING",
            )
            .bind(provider.id)
            .bind(&provider.name)
            .bind(&provider.experience)
            .bind(provider.rating)
            .bind(provider.reviews)
            .bind(&provider.tags)
            .bind(&provider.service_ids)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found_or_unexpected(what: String) -> impl FnOnce(sqlx::Error) -> PortError {
    move |e| match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what),
        other => unexpected(other),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

const USER_COLUMNS: &str =
    "id, username, full_name, phone_number, address, emergency_contact, emergency_phone";

#[derive(FromRow)]
struct UserRecord {
    id: i64,
    username: String,
    full_name: Option<String>,
    phone_number: Option<String>,
    address: Option<String>,
    emergency_contact: Option<String>,
    emergency_phone: Option<String>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            username: self.username,
            full_name: self.full_name,
            phone_number: self.phone_number,
            address: self.address,
            emergency_contact: self.emergency_contact,
            emergency_phone: self.emergency_phone,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    id: i64,
    username: String,
    password: String,
}

#[derive(FromRow)]
struct ServiceRecord {
    id: i64,
    name: String,
    short_description: String,
    description: String,
    icon: String,
    inclusions: Vec<String>,
}
impl ServiceRecord {
    fn to_domain(self) -> Service {
        Service {
            id: self.id,
            name: self.name,
            short_description: self.short_description,
            description: self.description,
            icon: self.icon,
            inclusions: self.inclusions,
        }
    }
}

#[derive(FromRow)]
struct ProviderRecord {
    id: i64,
    name: String,
    experience: String,
    rating: f64,
    reviews: i32,
    tags: Vec<String>,
    service_ids: Vec<i64>,
}
impl ProviderRecord {
    fn to_domain(self) -> Provider {
        Provider {
            id: self.id,
            name: self.name,
            experience: self.experience,
            rating: self.rating,
            reviews: self.reviews,
            tags: self.tags,
            service_ids: self.service_ids,
        }
    }
}

const BOOKING_COLUMNS: &str =
    "id, user_id, service_id, provider_id, appointment_date, notes, status";

#[derive(FromRow)]
struct BookingRecord {
    id: i64,
    user_id: i64,
    service_id: i64,
    provider_id: i64,
    appointment_date: DateTime<Utc>,
    notes: Option<String>,
    status: String,
}
impl BookingRecord {
    fn to_domain(self) -> PortResult<Booking> {
        let status = self
            .status
            .parse::<BookingStatus>()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(Booking {
            id: self.id,
            user_id: self.user_id,
            service_id: self.service_id,
            provider_id: self.provider_id,
            appointment_date: self.appointment_date,
            notes: self.notes,
            status,
        })
    }
}

const MESSAGE_COLUMNS: &str = "id, user_id, provider_id, content, from_user, \"timestamp\"";

#[derive(FromRow)]
struct MessageRecord {
    id: i64,
    user_id: i64,
    provider_id: i64,
    content: String,
    from_user: bool,
    timestamp: DateTime<Utc>,
}
impl MessageRecord {
    fn to_domain(self) -> Message {
        Message {
            id: self.id,
            user_id: self.user_id,
            provider_id: self.provider_id,
            content: self.content,
            from_user: self.from_user,
            timestamp: self.timestamp,
        }
    }
}

//=========================================================================================
// `EntityStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl EntityStore for PgStore {
    async fn create_user(&self, user: NewUser) -> PortResult<User> {
        let sql = format!(
            "INSERT INTO users (username, password, full_name, phone_number) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(&user.username)
            .bind(&user.hashed_password)
            .bind(&user.full_name)
            .bind(&user.phone_number)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let duplicate = e
                    .as_database_error()
                    .and_then(|d| d.code())
                    .is_some_and(|code| code == UNIQUE_VIOLATION);
                if duplicate {
                    PortError::Conflict(format!("username '{}' is already taken", user.username))
                } else {
                    unexpected(e)
                }
            })?;
        Ok(record.to_domain())
    }

    async fn get_user(&self, user_id: UserId) -> PortResult<User> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(not_found_or_unexpected(format!("User {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn get_user_credentials(&self, username: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, username, password FROM users WHERE lower(username) = lower($1)",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or_unexpected(format!("User '{}' not found", username)))?;
        Ok(UserCredentials {
            user_id: record.id,
            username: record.username,
            hashed_password: record.password,
        })
    }

    async fn update_user_profile(
        &self,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> PortResult<User> {
        let sql = format!(
            "UPDATE users SET \
                full_name = COALESCE($2, full_name), \
                phone_number = COALESCE($3, phone_number), \
                address = COALESCE($4, address), \
                emergency_contact = COALESCE($5, emergency_contact), \
                emergency_phone = COALESCE($6, emergency_phone) \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(user_id)
            .bind(update.full_name)
            .bind(update.phone_number)
            .bind(update.address)
            .bind(update.emergency_contact)
            .bind(update.emergency_phone)
            .fetch_one(&self.pool)
            .await
            .map_err(not_found_or_unexpected(format!("User {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= now()")
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<UserId> {
        sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > now()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or(PortError::Unauthenticated)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn list_services(&self) -> PortResult<Vec<Service>> {
        let records = sqlx::query_as::<_, ServiceRecord>(
            "SELECT id, name, short_description, description, icon, inclusions \
             FROM services ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_service(&self, service_id: ServiceId) -> PortResult<Service> {
        let record = sqlx::query_as::<_, ServiceRecord>(
            "SELECT id, name, short_description, description, icon, inclusions \
             FROM services WHERE id = $1",
        )
        .bind(service_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or_unexpected(format!("Service {} not found", service_id)))?;
        Ok(record.to_domain())
    }

    async fn get_provider(&self, provider_id: ProviderId) -> PortResult<Provider> {
        let record = sqlx::query_as::<_, ProviderRecord>(
            "SELECT id, name, experience, rating, reviews, tags, service_ids \
             FROM providers WHERE id = $1",
        )
        .bind(provider_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or_unexpected(format!(
            "Provider {} not found",
            provider_id
        )))?;
        Ok(record.to_domain())
    }

    async fn list_providers_for_service(
        &self,
        service_id: ServiceId,
    ) -> PortResult<Vec<Provider>> {
        let records = sqlx::query_as::<_, ProviderRecord>(
            "SELECT id, name, experience, rating, reviews, tags, service_ids \
             FROM providers WHERE $1 = ANY(service_ids) ORDER BY id",
        )
        .bind(service_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_booking(
        &self,
        booking: NewBooking,
        enforce_unique_slot: bool,
    ) -> PortResult<Booking> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        if enforce_unique_slot {
            // Serializes concurrent bookings of one provider until commit.
            sqlx::query("SELECT pg_advisory_xact_lock($1)")
                .bind(booking.provider_id)
                .execute(&mut *tx)
                .await
                .map_err(unexpected)?;
            let taken = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS (SELECT 1 FROM bookings \
                 WHERE provider_id = $1 AND status = 'scheduled' \
                 AND date_trunc('minute', appointment_date) = date_trunc('minute', $2::timestamptz))",
            )
            .bind(booking.provider_id)
            .bind(booking.appointment_date)
            .fetch_one(&mut *tx)
            .await
            .map_err(unexpected)?;
            if taken {
                return Err(PortError::Conflict(format!(
                    "provider {} is already booked at {}",
                    booking.provider_id,
                    booking.appointment_date.format("%Y-%m-%d %H:%M")
                )));
            }
        }

        let sql = format!(
            "INSERT INTO bookings (user_id, service_id, provider_id, appointment_date, notes, status) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            BOOKING_COLUMNS
        );
        let record = sqlx::query_as::<_, BookingRecord>(&sql)
            .bind(booking.user_id)
            .bind(booking.service_id)
            .bind(booking.provider_id)
            .bind(booking.appointment_date)
            .bind(&booking.notes)
            .bind(BookingStatus::Scheduled.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(unexpected)?;
        tx.commit().await.map_err(unexpected)?;
        record.to_domain()
    }

    async fn get_booking(&self, booking_id: BookingId) -> PortResult<Booking> {
        let sql = format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS);
        sqlx::query_as::<_, BookingRecord>(&sql)
            .bind(booking_id)
            .fetch_one(&self.pool)
            .await
            .map_err(not_found_or_unexpected(format!(
                "Booking {} not found",
                booking_id
            )))?
            .to_domain()
    }

    async fn list_bookings_for_user(&self, user_id: UserId) -> PortResult<Vec<Booking>> {
        let sql = format!(
            "SELECT {} FROM bookings WHERE user_id = $1 ORDER BY id",
            BOOKING_COLUMNS
        );
        sqlx::query_as::<_, BookingRecord>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?
            .into_iter()
            .map(|r| r.to_domain())
            .collect()
    }

    async fn list_bookings_for_provider(
        &self,
        provider_id: ProviderId,
    ) -> PortResult<Vec<Booking>> {
        let sql = format!(
            "SELECT {} FROM bookings WHERE provider_id = $1 ORDER BY id",
            BOOKING_COLUMNS
        );
        sqlx::query_as::<_, BookingRecord>(&sql)
            .bind(provider_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?
            .into_iter()
            .map(|r| r.to_domain())
            .collect()
    }

    async fn delete_booking(&self, booking_id: BookingId) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(booking_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Booking {} not found",
                booking_id
            )));
        }
        Ok(())
    }

    async fn add_favorite(&self, user_id: UserId, provider_id: ProviderId) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO favorites (user_id, provider_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, provider_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(provider_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn remove_favorite(&self, user_id: UserId, provider_id: ProviderId) -> PortResult<()> {
        sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND provider_id = $2")
            .bind(user_id)
            .bind(provider_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn list_favorite_provider_ids(&self, user_id: UserId) -> PortResult<Vec<ProviderId>> {
        sqlx::query_scalar::<_, i64>(
            "SELECT provider_id FROM favorites WHERE user_id = $1 ORDER BY created_at, seq",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)
    }

    async fn is_favorite(&self, user_id: UserId, provider_id: ProviderId) -> PortResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM favorites WHERE user_id = $1 AND provider_id = $2)",
        )
        .bind(user_id)
        .bind(provider_id)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)
    }

    async fn create_message(&self, message: NewMessage) -> PortResult<Message> {
        let sql = format!(
            "INSERT INTO messages (user_id, provider_id, content, from_user, \"timestamp\") \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            MESSAGE_COLUMNS
        );
        let record = sqlx::query_as::<_, MessageRecord>(&sql)
            .bind(message.user_id)
            .bind(message.provider_id)
            .bind(&message.content)
            .bind(message.from_user)
            .bind(message.timestamp)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn list_messages(
        &self,
        user_id: UserId,
        provider_id: ProviderId,
    ) -> PortResult<Vec<Message>> {
        let sql = format!(
            "SELECT {} FROM messages WHERE user_id = $1 AND provider_id = $2 \
             ORDER BY \"timestamp\" ASC, id ASC",
            MESSAGE_COLUMNS
        );
        let records = sqlx::query_as::<_, MessageRecord>(&sql)
            .bind(user_id)
            .bind(provider_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_messaged_provider_ids(&self, user_id: UserId) -> PortResult<Vec<ProviderId>> {
        sqlx::query_scalar::<_, i64>(
            "SELECT provider_id FROM messages WHERE user_id = $1 \
             GROUP BY provider_id ORDER BY MIN(id)",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)
    }
}
