//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use home_services_core::UserId;
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::web::state::AppState;

/// The authenticated caller, inserted into request extensions by [`require_auth`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

/// Middleware that resolves the caller through the configured identity resolver.
///
/// On success the user id is inserted into request extensions for handlers to use.
/// Otherwise the request is answered with 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = state.identity.resolve(req.headers()).await.map_err(|e| {
        debug!("Rejecting unauthenticated request to {}: {}", req.uri().path(), e);
        e
    })?;

    req.extensions_mut().insert(CurrentUser(user_id));

    Ok(next.run(req).await)
}
