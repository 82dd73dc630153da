//! services/api/src/web/favorites.rs
//!
//! Handlers for the caller's favorite providers.

use crate::error::ApiError;
use crate::web::dto::{FavoriteRequest, ProviderResponse};
use crate::web::middleware::CurrentUser;
use crate::web::extract::JsonBody;
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use home_services_core::ProviderId;
use std::sync::Arc;

/// List the caller's favorite providers.
#[utoipa::path(
    get,
    path = "/api/user/favorites",
    responses(
        (status = 200, description = "Favorite providers, all with isFavorite = true", body = [ProviderResponse]),
        (status = 401, description = "No valid session")
    )
)]
pub async fn list_favorites_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<Vec<ProviderResponse>>, ApiError> {
    let providers = app_state.ledger.favorite_providers(user_id).await?;
    Ok(Json(providers.into_iter().map(Into::into).collect()))
}

/// Mark a provider as a favorite. Repeating the call has no further effect.
#[utoipa::path(
    post,
    path = "/api/user/favorites",
    request_body = FavoriteRequest,
    responses(
        (status = 201, description = "Provider is a favorite"),
        (status = 401, description = "No valid session")
    )
)]
pub async fn add_favorite_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    JsonBody(payload): JsonBody<FavoriteRequest>,
) -> Result<StatusCode, ApiError> {
    app_state
        .ledger
        .add_favorite(user_id, payload.provider_id)
        .await?;
    Ok(StatusCode::CREATED)
}

/// Remove a provider from the caller's favorites. Removing a non-favorite is a no-op.
#[utoipa::path(
    delete,
    path = "/api/user/favorites/{providerId}",
    params(("providerId" = i64, Path, description = "Provider id")),
    responses(
        (status = 204, description = "Provider is not a favorite"),
        (status = 401, description = "No valid session")
    )
)]
pub async fn remove_favorite_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(provider_id): Path<ProviderId>,
) -> Result<StatusCode, ApiError> {
    app_state.ledger.remove_favorite(user_id, provider_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
