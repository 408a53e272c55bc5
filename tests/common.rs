use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use figment::{
    providers::{Format, Yaml},
    Figment,
};
use foodbridge::auth::TokenService;
use foodbridge::config::{Config, ConfigV1};
use foodbridge::routes::create_router;
use foodbridge::state::AppState;
use foodbridge::store::{create_store, Store};
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_CONFIG: &str = r#"
version: "1.0.0"
logging:
  level: "debug"
  format: "json"
store:
  type: "memory"
jwt:
  iss: foodbridge-test
  exp: 7200
  secret: test-secret
production: false
bind_address: 127.0.0.1:8081
"#;

pub fn load_test_config() -> ConfigV1 {
    let config: Config = Figment::new()
        .merge(Yaml::string(TEST_CONFIG))
        .extract()
        .expect("Failed to parse test config YAML");

    match config {
        Config::ConfigV1(cfg) => cfg,
    }
}

/// Builds the app against a fresh in-memory store. The store handle is
/// returned too so tests can seed states the HTTP surface cannot produce
/// (e.g. an orphaned claim left behind by a failed cascade).
pub async fn build_app() -> (Router, Arc<ConfigV1>, Arc<dyn Store>) {
    let config = Arc::new(load_test_config());
    let store = create_store(&config.store).await;
    let tokens = Arc::new(TokenService::new(config.jwt.clone()));

    let state = AppState {
        config: config.clone(),
        tokens,
        store: store.clone(),
    };

    (create_router(state), config, store)
}

/// Builds a request with an optional session cookie and optional JSON body.
pub fn build_request(
    method: Method,
    path: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);

    if let Some(cookie) = cookie {
        builder = builder.header("Cookie", cookie);
    }

    match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("failed to build request"),
        None => builder.body(Body::empty()).expect("failed to build request"),
    }
}

/// Dispatches a request against the app and returns the response.
pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone()
        .oneshot(request)
        .await
        .expect("request should succeed")
}

/// Collects a response body into JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

/// Logs in via `POST /jwt` and returns the `token=...` cookie pair to send
/// back on subsequent requests.
pub async fn login(app: &Router, email: &str) -> String {
    let response = send(
        app,
        build_request(
            Method::POST,
            "/jwt",
            None,
            Some(serde_json::json!({ "email": email })),
        ),
    )
    .await;

    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("Set-Cookie header missing")
        .to_str()
        .expect("Set-Cookie header not valid UTF-8");

    set_cookie
        .split(';')
        .next()
        .expect("Set-Cookie header empty")
        .to_string()
}
