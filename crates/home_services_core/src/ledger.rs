//! crates/home_services_core/src/ledger.rs
//!
//! Favorite providers and user/provider message threads.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::{Message, NewMessage, ProviderId, ProviderView, UserId};
use crate::ports::{EntityStore, PortError, PortResult};

/// The text of the scripted reply a provider sends after a user message.
pub const AUTO_REPLY_TEXT: &str = "Thank you for your message. I'll get back to you shortly.";

#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn EntityStore>,
}

impl Ledger {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    // --- Favorites ---

    /// Idempotent: favoriting twice leaves a single relationship.
    pub async fn add_favorite(&self, user_id: UserId, provider_id: ProviderId) -> PortResult<()> {
        self.store.add_favorite(user_id, provider_id).await
    }

    /// Idempotent: removing a missing favorite is not an error.
    pub async fn remove_favorite(&self, user_id: UserId, provider_id: ProviderId) -> PortResult<()> {
        self.store.remove_favorite(user_id, provider_id).await
    }

    pub async fn favorite_providers(&self, user_id: UserId) -> PortResult<Vec<ProviderView>> {
        let ids = self.store.list_favorite_provider_ids(user_id).await?;
        let mut views = Vec::with_capacity(ids.len());
        for provider_id in ids {
            match self.store.get_provider(provider_id).await {
                Ok(provider) => views.push(ProviderView {
                    provider,
                    is_favorite: true,
                }),
                // Favorites can outlive catalog entries.
                Err(PortError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(views)
    }

    // --- Messages ---

    pub async fn send_message(
        &self,
        user_id: UserId,
        provider_id: ProviderId,
        content: &str,
        now: DateTime<Utc>,
    ) -> PortResult<Message> {
        if content.trim().is_empty() {
            return Err(PortError::Validation(
                "message content must not be empty".to_string(),
            ));
        }
        self.store
            .create_message(NewMessage {
                user_id,
                provider_id,
                content: content.to_string(),
                from_user: true,
                timestamp: now,
            })
            .await
    }

    /// Records the provider's scripted answer in the thread.
    pub async fn record_auto_reply(
        &self,
        user_id: UserId,
        provider_id: ProviderId,
        now: DateTime<Utc>,
    ) -> PortResult<Message> {
        self.store
            .create_message(NewMessage {
                user_id,
                provider_id,
                content: AUTO_REPLY_TEXT.to_string(),
                from_user: false,
                timestamp: now,
            })
            .await
    }

    pub async fn thread(&self, user_id: UserId, provider_id: ProviderId) -> PortResult<Vec<Message>> {
        self.store.list_messages(user_id, provider_id).await
    }

    /// Providers the user has messaged, each flagged with the user's favorite status.
    pub async fn messaged_providers(&self, user_id: UserId) -> PortResult<Vec<ProviderView>> {
        let ids = self.store.list_messaged_provider_ids(user_id).await?;
        let mut views = Vec::with_capacity(ids.len());
        for provider_id in ids {
            let provider = match self.store.get_provider(provider_id).await {
                Ok(provider) => provider,
                Err(PortError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            };
            let is_favorite = self.store.is_favorite(user_id, provider_id).await?;
            views.push(ProviderView {
                provider,
                is_favorite,
            });
        }
        Ok(views)
    }
}
