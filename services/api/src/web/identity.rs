//! services/api/src/web/identity.rs
//!
//! Resolves the user behind an incoming request.

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use home_services_core::ports::{EntityStore, PortError, PortResult};
use home_services_core::UserId;
use std::sync::Arc;

pub const SESSION_COOKIE: &str = "session";

/// Maps a request to the id of the user making it.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Returns `PortError::Unauthenticated` when no identity can be established.
    async fn resolve(&self, headers: &HeaderMap) -> PortResult<UserId>;
}

/// Extracts the auth session id from the `Cookie` header, if any.
pub fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| {
            let (name, value) = c.trim().split_once('=')?;
            (name == SESSION_COOKIE && !value.is_empty()).then_some(value)
        })
}

/// Validates the `session` cookie against the auth sessions in the store.
pub struct SessionCookieResolver {
    store: Arc<dyn EntityStore>,
}

impl SessionCookieResolver {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl IdentityResolver for SessionCookieResolver {
    async fn resolve(&self, headers: &HeaderMap) -> PortResult<UserId> {
        let session_id = session_cookie(headers).ok_or(PortError::Unauthenticated)?;
        self.store.validate_auth_session(session_id).await
    }
}

/// Resolves every request to one configured user. Never use in production.
pub struct FixedUserResolver {
    user_id: UserId,
}

impl FixedUserResolver {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}

#[async_trait]
impl IdentityResolver for FixedUserResolver {
    async fn resolve(&self, _headers: &HeaderMap) -> PortResult<UserId> {
        Ok(self.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn finds_session_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc123; lang=en"),
        );
        assert_eq!(session_cookie(&headers), Some("abc123"));
    }

    #[test]
    fn ignores_empty_and_lookalike_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("session=; old_session=zzz"),
        );
        assert_eq!(session_cookie(&headers), None);
        assert_eq!(session_cookie(&HeaderMap::new()), None);
    }
}
