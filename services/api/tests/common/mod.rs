#![allow(dead_code)]

use api_lib::adapters::{seed, MemoryStore};
use api_lib::config::{AuthMode, Config};
use home_services_core::{BookingPolicy, EntityStore, Provider, Service, SlotTemplate};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

pub fn test_config(auth_mode: AuthMode) -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: None,
        log_level: Level::DEBUG,
        cors_origin: "http://localhost:5173".to_string(),
        auth_mode,
        session_ttl_days: 30,
        slot_template: SlotTemplate::default(),
        booking_policy: BookingPolicy::default(),
        auto_reply_delay: None,
    }
}

pub fn seeded_store() -> Arc<dyn EntityStore> {
    Arc::new(MemoryStore::with_catalog(seed::services(), seed::providers()))
}

pub fn cleaning_service() -> Service {
    Service {
        id: 1,
        name: "House Cleaning".to_string(),
        short_description: "Cleaning".to_string(),
        description: "Cleaning your home".to_string(),
        icon: "cleaning_services".to_string(),
        inclusions: vec!["Dusting".to_string()],
    }
}

pub fn cleaner(id: i64, service_ids: Vec<i64>) -> Provider {
    Provider {
        id,
        name: format!("Cleaner {}", id),
        experience: "5 years".to_string(),
        rating: 4.5,
        reviews: 10,
        tags: vec![],
        service_ids,
    }
}

/// Polls `check` until it holds or the timeout elapses.
pub async fn eventually<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check().await
}
