//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for registration, login, logout and the caller's profile.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use home_services_core::ports::PortError;
use home_services_core::{NewUser, ProfileUpdate, UserId};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::dto::UserResponse;
use crate::web::identity::{session_cookie, SESSION_COOKIE};
use crate::web::middleware::CurrentUser;
use crate::web::extract::JsonBody;
use crate::web::state::AppState;

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Profile fields to change. Omitted fields keep their current value.
#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
}

//=========================================================================================
// Session Helpers
//=========================================================================================

/// Creates an auth session for the user and returns the `Set-Cookie` value.
async fn start_session(state: &AppState, user_id: UserId) -> Result<String, ApiError> {
    let auth_session_id = Uuid::new_v4().to_string();
    let ttl = Duration::try_days(state.config.session_ttl_days)
        .filter(|ttl| *ttl > Duration::zero())
        .ok_or_else(|| ApiError::Internal("Invalid session lifetime".to_string()))?;
    let expires_at = Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| ApiError::Internal("Session expiry overflows".to_string()))?;

    state
        .store
        .create_auth_session(&auth_session_id, user_id, expires_at)
        .await?;

    Ok(format!(
        "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        auth_session_id,
        ttl.num_seconds()
    ))
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            ApiError::Internal("Failed to hash password".to_string())
        })
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/register - Create a new user account and log it in
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created successfully", body = UserResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = req.username.trim().to_string();
    if username.is_empty() || req.password.is_empty() {
        return Err(
            PortError::Validation("username and password are required".to_string()).into(),
        );
    }

    let password_hash = hash_password(&req.password)?;
    let user = state
        .store
        .create_user(NewUser {
            username,
            hashed_password: password_hash,
            full_name: req.full_name,
            phone_number: req.phone_number,
        })
        .await?;

    let cookie = start_session(&state, user.id).await?;
    info!(user_id = user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(UserResponse::from(user)),
    ))
}

/// POST /api/login - Login with an existing account
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = UserResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Unknown users and wrong passwords look the same to the caller.
    let user_creds = match state.store.get_user_credentials(req.username.trim()).await {
        Ok(creds) => creds,
        Err(PortError::NotFound(_)) => return Err(PortError::Unauthenticated.into()),
        Err(e) => return Err(e.into()),
    };

    let parsed_hash = PasswordHash::new(&user_creds.hashed_password).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        ApiError::Internal("Authentication error".to_string())
    })?;

    let valid = Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_ok();
    if !valid {
        return Err(PortError::Unauthenticated.into());
    }

    let user = state.store.get_user(user_creds.user_id).await?;
    let cookie = start_session(&state, user.id).await?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(UserResponse::from(user)),
    ))
}

/// POST /api/logout - Logout and invalidate the session
#[utoipa::path(
    post,
    path = "/api/logout",
    responses((status = 200, description = "Logout successful"))
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(auth_session_id) = session_cookie(&headers) {
        state.store.delete_auth_session(auth_session_id).await?;
    }

    let cookie = format!(
        "{}=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0",
        SESSION_COOKIE
    );
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)]))
}

/// GET /api/user - The authenticated user
#[utoipa::path(
    get,
    path = "/api/user",
    responses(
        (status = 200, description = "The caller", body = UserResponse),
        (status = 401, description = "No valid session")
    )
)]
pub async fn current_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.store.get_user(user_id).await?;
    Ok(Json(user.into()))
}

/// PATCH /api/user/profile - Update the caller's profile
#[utoipa::path(
    patch,
    path = "/api/user/profile",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 401, description = "No valid session")
    )
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    JsonBody(req): JsonBody<ProfileUpdateRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let update = ProfileUpdate {
        full_name: req.full_name,
        phone_number: req.phone_number,
        address: req.address,
        emergency_contact: req.emergency_contact,
        emergency_phone: req.emergency_phone,
    };
    let user = state.store.update_user_profile(user_id, update).await?;
    Ok(Json(user.into()))
}
