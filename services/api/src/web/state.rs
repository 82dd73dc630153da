//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::{AuthMode, Config};
use crate::web::identity::{FixedUserResolver, IdentityResolver, SessionCookieResolver};
use home_services_core::{AvailabilityChecker, BookingManager, EntityStore, Ledger};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub config: Arc<Config>,
    pub identity: Arc<dyn IdentityResolver>,
    pub availability: AvailabilityChecker,
    pub bookings: BookingManager,
    pub ledger: Ledger,
    /// Cancelled on shutdown so pending background work is dropped.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Wires the domain components and the identity resolver around one store.
    pub fn new(store: Arc<dyn EntityStore>, config: Arc<Config>) -> Self {
        let identity: Arc<dyn IdentityResolver> = match config.auth_mode {
            AuthMode::Session => Arc::new(SessionCookieResolver::new(store.clone())),
            AuthMode::Disabled { user_id } => Arc::new(FixedUserResolver::new(user_id)),
        };

        Self {
            availability: AvailabilityChecker::new(store.clone(), config.slot_template.clone()),
            bookings: BookingManager::new(store.clone(), config.booking_policy),
            ledger: Ledger::new(store.clone()),
            identity,
            store,
            config,
            shutdown: CancellationToken::new(),
        }
    }
}
