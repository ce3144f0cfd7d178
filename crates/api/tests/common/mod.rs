#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use lotmap_api::auth::jwt::{Claims, JwtConfig};
use lotmap_api::config::ServerConfig;
use lotmap_api::router::build_app_router;
use lotmap_api::state::AppState;
use lotmap_core::store::MemoryStore;
use lotmap_core::types::DbId;
use tower::ServiceExt;

const TEST_SECRET: &str = "lotmap-integration-test-secret";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        viewer_any_origin: true,
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: None,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
        },
    }
}

/// Build the full application router over a fresh in-memory store.
///
/// Goes through [`build_app_router`] so tests exercise the same middleware
/// stack (CORS, request ID, timeout, tracing, panic recovery) that
/// production uses. The router is cheap to clone and every clone shares the
/// same store.
pub fn build_test_app() -> Router {
    let config = test_config();
    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Bearer token for `user_id`, signed with the test secret the way the
/// account service signs real ones.
pub fn token_for(user_id: DbId) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        exp: now + 15 * 60,
        iat: now,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("token generation")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("valid request");
    app.oneshot(request).await.expect("infallible")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Create a map owned by `owner` and return its JSON.
pub async fn create_map(app: &Router, owner: DbId, name: &str, public: bool) -> serde_json::Value {
    let response = post_json_auth(
        app.clone(),
        "/api/map-settings",
        serde_json::json!({ "name": name, "isPublic": public }),
        &token_for(owner),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await
}

/// Create a rectangular lot on `map_id` and return its JSON.
pub async fn create_lot(
    app: &Router,
    owner: DbId,
    map_id: i64,
    extra: serde_json::Value,
) -> serde_json::Value {
    let mut body = serde_json::json!({
        "mapId": map_id,
        "number": "1",
        "x": 10, "y": 10, "width": 140, "height": 110
    });
    if let (Some(target), Some(fields)) = (body.as_object_mut(), extra.as_object()) {
        for (k, v) in fields {
            target.insert(k.clone(), v.clone());
        }
    }
    let response = post_json_auth(app.clone(), "/api/lots", body, &token_for(owner)).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await
}
