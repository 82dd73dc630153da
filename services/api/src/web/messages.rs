//! services/api/src/web/messages.rs
//!
//! Handlers for message threads between the caller and providers.

use crate::error::ApiError;
use crate::web::dto::{MessageResponse, ProviderResponse, SendMessageRequest};
use crate::web::middleware::CurrentUser;
use crate::web::reply_task::schedule_auto_reply;
use crate::web::extract::JsonBody;
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use home_services_core::ProviderId;
use std::sync::Arc;

/// List the providers the caller has messaged, with their favorite status.
#[utoipa::path(
    get,
    path = "/api/messages/providers",
    responses(
        (status = 200, description = "Messaged providers", body = [ProviderResponse]),
        (status = 401, description = "No valid session")
    )
)]
pub async fn list_messaged_providers_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<Vec<ProviderResponse>>, ApiError> {
    let providers = app_state.ledger.messaged_providers(user_id).await?;
    Ok(Json(providers.into_iter().map(Into::into).collect()))
}

/// The caller's thread with one provider, oldest message first.
#[utoipa::path(
    get,
    path = "/api/messages/provider/{providerId}",
    params(("providerId" = i64, Path, description = "Provider id")),
    responses(
        (status = 200, description = "Messages in timestamp order", body = [MessageResponse]),
        (status = 401, description = "No valid session")
    )
)]
pub async fn get_thread_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(provider_id): Path<ProviderId>,
) -> Result<Json<Vec<MessageResponse>>, ApiError> {
    let thread = app_state.ledger.thread(user_id, provider_id).await?;
    Ok(Json(thread.into_iter().map(Into::into).collect()))
}

/// Send a message to a provider. The provider's automatic reply arrives later.
#[utoipa::path(
    post,
    path = "/api/messages",
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message stored", body = MessageResponse),
        (status = 400, description = "Empty message"),
        (status = 401, description = "No valid session")
    )
)]
#[tracing::instrument(skip(app_state, payload))]
pub async fn send_message_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    JsonBody(payload): JsonBody<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = app_state
        .ledger
        .send_message(user_id, payload.provider_id, &payload.content, Utc::now())
        .await?;

    if let Some(delay) = app_state.config.auto_reply_delay {
        schedule_auto_reply(app_state.clone(), user_id, payload.provider_id, delay);
    }

    Ok((StatusCode::CREATED, Json(MessageResponse::from(message))))
}
