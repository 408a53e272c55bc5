//! Session endpoints: token issuance and logout.
//!
//! `POST /jwt` signs a token for the given email and sets it as an httpOnly
//! cookie; `GET /logout` clears the cookie. Neither requires authentication.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::auth::cookie::{clear_session_cookie, session_cookie};
use crate::state::AppState;
use crate::utils::http_helpers::ApiError;

/// Registers session routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/jwt", post(issue_token))
        .route("/logout", get(logout))
}

#[derive(Deserialize)]
struct IssueTokenRequest {
    email: String,
}

/// Attaches a `Set-Cookie` header to a `{"success": true}` body.
fn cookie_response(cookie: String) -> Result<Response, ApiError> {
    let header_value = HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::Store(format!("Invalid cookie value: {}", e)))?;

    let mut response = Json(json!({ "success": true })).into_response();
    response.headers_mut().insert(SET_COOKIE, header_value);
    Ok(response)
}

/// Issues a session token for the given email and sets it as a cookie.
async fn issue_token(
    State(state): State<AppState>,
    Json(payload): Json<IssueTokenRequest>,
) -> Result<Response, ApiError> {
    if payload.email.trim().is_empty() {
        return Err(ApiError::InvalidPayload("email must not be empty".into()));
    }

    debug!("Issuing session token for '{}'", payload.email);
    let token = state.tokens.issue(&payload.email);
    let cookie = session_cookie(state.config.production, &token, state.tokens.lifetime());

    cookie_response(cookie)
}

/// Clears the session cookie.
async fn logout(State(state): State<AppState>) -> Result<Response, ApiError> {
    cookie_response(clear_session_cookie(state.config.production))
}
