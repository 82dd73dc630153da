//! services/api/src/web/reply_task.rs
//!
//! This module contains the background "worker" that posts a provider's scripted
//! reply some time after a user writes to them.

use crate::web::state::AppState;
use chrono::Utc;
use home_services_core::{ProviderId, UserId};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Spawns a fire-and-forget task that records the auto-reply after `delay`.
///
/// The caller never waits on it. If the application shuts down first the reply
/// is dropped; storage failures are logged and otherwise ignored.
pub fn schedule_auto_reply(
    app_state: Arc<AppState>,
    user_id: UserId,
    provider_id: ProviderId,
    delay: Duration,
) -> JoinHandle<()> {
    let shutdown = app_state.shutdown.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!(user_id, provider_id, "Shutdown before auto-reply was sent.");
            }
            _ = tokio::time::sleep(delay) => {
                match app_state
                    .ledger
                    .record_auto_reply(user_id, provider_id, Utc::now())
                    .await
                {
                    Ok(message) => info!(message_id = message.id, provider_id, "Auto-reply recorded."),
                    Err(e) => error!("Failed to record auto-reply: {:?}", e),
                }
            }
        }
    })
}
