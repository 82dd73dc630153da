//! HTTP-level tests that drive the full router without binding a socket.

mod common;

use api_lib::config::AuthMode;
use api_lib::web::build_router;
use api_lib::web::state::AppState;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::{seeded_store, test_config};
use home_services_core::EntityStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app(auth_mode: AuthMode) -> Router {
    let state = Arc::new(AppState::new(seeded_store(), Arc::new(test_config(auth_mode))));
    build_router(state).unwrap()
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Option<String>, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or_default().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, set_cookie, json)
}

async fn register(app: &Router, username: &str) -> String {
    let (status, cookie, body) = send(
        app,
        "POST",
        "/api/register",
        None,
        Some(json!({ "username": username, "password": "hunter22", "fullName": "Test User" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], username);
    cookie.expect("register sets a session cookie")
}

#[tokio::test]
async fn catalog_is_public() {
    let app = app(AuthMode::Session);

    let (status, _, body) = send(&app, "GET", "/api/services", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 4);
    assert!(body[0]["shortDescription"].is_string());

    let (status, _, body) = send(&app, "GET", "/api/services/1/providers", None, None).await;
    assert_eq!(status, StatusCode::OK);
    for provider in body.as_array().unwrap() {
        let ids: Vec<i64> = provider["serviceIds"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_i64().unwrap())
            .collect();
        assert!(ids.contains(&1));
    }
}

#[tokio::test]
async fn unknown_entities_are_404_with_a_message() {
    let app = app(AuthMode::Session);

    let (status, _, body) = send(&app, "GET", "/api/services/999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].is_string());

    let (status, _, _) = send(&app, "GET", "/api/providers/999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(
        &app,
        "GET",
        "/api/providers/999/availability?date=2024-06-01",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_availability_date_is_400() {
    let app = app(AuthMode::Session);
    let (status, _, body) = send(
        &app,
        "GET",
        "/api/providers/1/availability?date=June-first",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("June-first"));
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let app = app(AuthMode::Session);
    for (method, uri) in [
        ("GET", "/api/user"),
        ("GET", "/api/bookings"),
        ("GET", "/api/bookings/schedule"),
        ("GET", "/api/user/favorites"),
        ("GET", "/api/messages/providers"),
        ("GET", "/api/messages/provider/1"),
        ("DELETE", "/api/bookings/1"),
    ] {
        let (status, _, _) = send(&app, method, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
    }

    let (status, _, _) = send(&app, "GET", "/api/user", Some("session=bogus"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn booking_through_http_hides_the_slot() {
    let app = app(AuthMode::Session);
    let cookie = register(&app, "alice").await;

    let (status, _, booking) = send(
        &app,
        "POST",
        "/api/bookings",
        Some(&cookie),
        Some(json!({
            "serviceId": 1,
            "providerId": 1,
            "appointmentDate": "2024-06-01T10:00",
            "notes": "Gate code 1234"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["status"], "scheduled");
    assert_eq!(booking["providerId"], 1);

    let (status, _, availability) = send(
        &app,
        "GET",
        "/api/providers/1/availability?date=2024-06-01",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let slots: Vec<&str> = availability["slots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert!(!slots.contains(&"10:00"));
    assert!(slots.contains(&"11:00"));

    let (status, _, mine) = send(&app, "GET", "/api/bookings", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);

    // A second user cannot take the same slot.
    let other = register(&app, "bob").await;
    let (status, _, body) = send(
        &app,
        "POST",
        "/api/bookings",
        Some(&other),
        Some(json!({ "serviceId": 1, "providerId": 1, "appointmentDate": "2024-06-01T10:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].is_string());

    // Nor cancel the first user's booking.
    let uri = format!("/api/bookings/{}", booking["id"]);
    let (status, _, _) = send(&app, "DELETE", &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = send(&app, "DELETE", &uri, Some(&cookie), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn booking_without_provider_is_400() {
    let app = app(AuthMode::Disabled { user_id: 1 });
    let (status, _, _) = send(
        &app,
        "POST",
        "/api/bookings",
        None,
        Some(json!({ "serviceId": 1, "appointmentDate": "2024-06-01T10:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn disabled_auth_acts_as_the_fixed_user() {
    let app = app(AuthMode::Disabled { user_id: 1 });

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/user/favorites",
        None,
        Some(json!({ "providerId": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, favorites) = send(&app, "GET", "/api/user/favorites", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let favorites = favorites.as_array().unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0]["id"], 2);
    assert_eq!(favorites[0]["isFavorite"], true);

    let (status, _, _) = send(&app, "DELETE", "/api/user/favorites/2", None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, _, favorites) = send(&app, "GET", "/api/user/favorites", None, None).await;
    assert!(favorites.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn messages_round_trip_over_http() {
    let app = app(AuthMode::Disabled { user_id: 1 });

    let (status, _, sent) = send(
        &app,
        "POST",
        "/api/messages",
        None,
        Some(json!({ "providerId": 3, "content": "Do you work weekends?" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sent["fromUser"], true);

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/messages",
        None,
        Some(json!({ "providerId": 3, "content": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, _, thread) = send(&app, "GET", "/api/messages/provider/3", None, None).await;
    assert_eq!(thread.as_array().unwrap().len(), 1);
    assert_eq!(thread[0]["content"], "Do you work weekends?");

    let (_, _, providers) = send(&app, "GET", "/api/messages/providers", None, None).await;
    assert_eq!(providers.as_array().unwrap().len(), 1);
    assert_eq!(providers[0]["id"], 3);
    assert_eq!(providers[0]["isFavorite"], false);
}

#[tokio::test]
async fn login_profile_and_logout() {
    let app = app(AuthMode::Session);
    register(&app, "carol").await;

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/register",
        None,
        Some(json!({ "username": "Carol", "password": "other" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "username": "carol", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, cookie, _) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "username": "carol", "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let cookie = cookie.unwrap();

    let (status, _, user) = send(
        &app,
        "PATCH",
        "/api/user/profile",
        Some(&cookie),
        Some(json!({ "address": "1 Main St" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["address"], "1 Main St");
    assert_eq!(user["fullName"], "Test User");

    let (status, _, _) = send(&app, "POST", "/api/logout", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(&app, "GET", "/api/user", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

async fn send_raw(app: &Router, uri: &str, content_type: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn malformed_bodies_are_400_with_a_message() {
    let app = app(AuthMode::Disabled { user_id: 1 });
    for (uri, content_type, body) in [
        ("/api/bookings", "application/json", "{\"serviceId\": 1,"),
        ("/api/bookings", "application/json", "{\"providerId\": \"first\"}"),
        ("/api/messages", "application/json", "[1, 2, 3]"),
        ("/api/user/favorites", "text/plain", "{\"providerId\": 2}"),
        ("/api/register", "application/json", "{\"username\": 5}"),
    ] {
        let (status, body) = send_raw(&app, uri, content_type, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri} {body}");
        assert!(body["message"].is_string(), "{uri} should answer with a message");
    }
}

#[tokio::test]
async fn oversized_session_lifetime_fails_without_panicking() {
    let mut config = test_config(AuthMode::Session);
    config.session_ttl_days = 100_000_000;
    let store: Arc<dyn EntityStore> = seeded_store();
    let app = build_router(Arc::new(AppState::new(store, Arc::new(config)))).unwrap();

    let (status, cookie, body) = send(
        &app,
        "POST",
        "/api/register",
        None,
        Some(json!({ "username": "dave", "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(cookie.is_none());
    assert_eq!(body["message"], "Internal server error");
}
